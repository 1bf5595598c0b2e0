//! Accessibility gate
//!
//! Special floors hold the explorer back when they enter the dungeon or
//! jump to an absolute level: nobody is placed below an uncleared special
//! floor. Walking down the stairs is never gated.

use std::collections::BTreeSet;

use tracing::info;

use crate::dungeon::{SpecialFloor, SpecialFloorRegistry};
use crate::special::quest::QuestState;

use super::floor_state::FloorStateStore;

#[derive(Debug, Clone, Copy)]
pub struct AccessibilityGate<'a> {
    registry: &'a SpecialFloorRegistry,
}

impl<'a> AccessibilityGate<'a> {
    pub fn new(registry: &'a SpecialFloorRegistry) -> Self {
        Self { registry }
    }

    /// Deepest level the explorer may be placed on when asking for
    /// `requested`: the lowest uncleared special floor at or above it, or
    /// `requested` itself.
    pub fn max_accessible_floor(&self, requested: u32, cleared: &BTreeSet<u32>) -> u32 {
        self.registry
            .iter()
            .take_while(|(level, _)| *level <= requested)
            .find(|(level, _)| !cleared.contains(level))
            .map_or(requested, |(level, _)| level.min(requested))
    }

    /// Migrate clearance evidence into the cleared set.
    ///
    /// Compatibility shim for saves whose cleared set fell out of step with
    /// the rest of the data: a special floor whose condition already holds
    /// in the quest state, or whose stored state was ever cleared, is added.
    /// Fresh saves keep the set current on exit and need nothing from here.
    /// Returns the levels added.
    pub fn reconcile_cleared(
        &self,
        cleared: &mut BTreeSet<u32>,
        store: &FloorStateStore,
        quest: &QuestState,
    ) -> Vec<u32> {
        let mut added = Vec::new();
        for (level, special) in self.registry.iter() {
            if cleared.contains(&level) {
                continue;
            }
            let ever_cleared = store.get(level).is_some_and(|s| s.ever_cleared);
            if special.is_satisfied(quest) || ever_cleared {
                cleared.insert(level);
                added.push(level);
            }
        }
        if !added.is_empty() {
            info!(?added, "reconciled cleared special floors");
        }
        added
    }

    /// The special floor that stops a climb from `current` to `target`:
    /// the highest uncleared one in `(target, current]`. None for descents.
    pub fn ascent_blocker(
        &self,
        current: u32,
        target: u32,
        cleared: &BTreeSet<u32>,
        quest: &QuestState,
    ) -> Option<(u32, SpecialFloor)> {
        if target >= current {
            return None;
        }
        self.registry
            .in_range(target + 1, current)
            .filter(|(level, special)| !cleared.contains(level) && !special.is_satisfied(quest))
            .last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Boss, SealType};
    use crate::special::quest::BossResolution;
    use crate::world::floor_state::FloorState;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn set(levels: &[u32]) -> BTreeSet<u32> {
        levels.iter().copied().collect()
    }

    #[test]
    fn test_clamps_to_first_uncleared() {
        let registry = SpecialFloorRegistry::standard();
        let gate = AccessibilityGate::new(&registry);
        assert_eq!(gate.max_accessible_floor(4, &set(&[])), 4);
        assert_eq!(gate.max_accessible_floor(12, &set(&[])), 5);
        assert_eq!(gate.max_accessible_floor(12, &set(&[5])), 10);
        assert_eq!(gate.max_accessible_floor(12, &set(&[5, 10])), 12);
        assert_eq!(gate.max_accessible_floor(5, &set(&[])), 5);
    }

    #[test]
    fn test_gaps_in_cleared_set_still_gate() {
        let registry = SpecialFloorRegistry::standard();
        let gate = AccessibilityGate::new(&registry);
        assert_eq!(gate.max_accessible_floor(30, &set(&[5, 15, 20])), 10);
    }

    #[test]
    fn test_reconcile_uses_quest_and_store() {
        let registry = SpecialFloorRegistry::standard();
        let gate = AccessibilityGate::new(&registry);
        let mut quest = QuestState::new();
        quest.record_seal(SealType::Tide);
        quest.set_boss_resolution(Boss::Warden, BossResolution::Engaged);

        let mut store = FloorStateStore::new();
        let mut five = FloorState::new(5, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        five.ever_cleared = true;
        store.insert(five);

        let mut cleared = BTreeSet::new();
        let added = gate.reconcile_cleared(&mut cleared, &store, &quest);
        assert_eq!(added, vec![5, 15]);
        assert_eq!(cleared, set(&[5, 15]));
        assert!(gate.reconcile_cleared(&mut cleared, &store, &quest).is_empty());
    }

    #[test]
    fn test_ascent_blocker() {
        let registry = SpecialFloorRegistry::standard();
        let gate = AccessibilityGate::new(&registry);
        let quest = QuestState::new();

        assert_eq!(
            gate.ascent_blocker(5, 4, &set(&[]), &quest),
            Some((5, SpecialFloor::Seal(SealType::Ember)))
        );
        assert_eq!(gate.ascent_blocker(7, 3, &set(&[5]), &quest), None);
        assert_eq!(gate.ascent_blocker(12, 3, &set(&[]), &quest).map(|(l, _)| l), Some(10));
        assert_eq!(gate.ascent_blocker(5, 9, &set(&[]), &quest), None);
        assert_eq!(gate.ascent_blocker(5, 5, &set(&[]), &quest), None);
    }

    proptest! {
        #[test]
        fn prop_gate_never_exceeds_request(requested in 1u32..60, mask in 0u16..512) {
            let registry = SpecialFloorRegistry::standard();
            let gate = AccessibilityGate::new(&registry);
            let specials: Vec<u32> = registry.iter().map(|(l, _)| l).collect();
            let cleared: BTreeSet<u32> = specials
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, l)| *l)
                .collect();

            let result = gate.max_accessible_floor(requested, &cleared);
            prop_assert!(result <= requested);

            let lowest_uncleared = specials
                .iter()
                .copied()
                .find(|l| *l <= requested && !cleared.contains(l));
            match lowest_uncleared {
                Some(level) => prop_assert_eq!(result, level),
                None => prop_assert_eq!(result, requested),
            }
        }

        #[test]
        fn prop_clearing_more_never_lowers_the_gate(requested in 1u32..60, extra in 0usize..9) {
            let registry = SpecialFloorRegistry::standard();
            let gate = AccessibilityGate::new(&registry);
            let specials: Vec<u32> = registry.iter().map(|(l, _)| l).collect();
            let before = BTreeSet::new();
            let mut after = before.clone();
            after.insert(specials[extra % specials.len()]);
            prop_assert!(gate.max_accessible_floor(requested, &after) >= gate.max_accessible_floor(requested, &before));
        }
    }
}
