//! Special floor definitions
//!
//! Some floors are not cleared by emptying their monster rooms. Seal floors
//! are cleared by obtaining the floor's seal, boss floors by resolving the
//! floor's boss. The registry is plain data handed to whoever needs it, so
//! gating logic can be exercised against synthetic layouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::special::quest::QuestState;

/// Collectible seal tied to one seal floor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SealType {
    Ember,
    Tide,
    Gale,
    Stone,
    Void,
}

/// Boss bound to one boss floor
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Boss {
    #[strum(serialize = "the Warden")]
    Warden,
    #[strum(serialize = "the Drowned Saint")]
    DrownedSaint,
    #[strum(serialize = "the Hollow King")]
    HollowKing,
    #[strum(serialize = "the Ashen Choir")]
    AshenChoir,
    #[strum(serialize = "the Sleeper")]
    Sleeper,
}

/// What a special floor demands before it counts as cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialFloor {
    /// Cleared by obtaining this seal
    Seal(SealType),
    /// Cleared by resolving this boss
    Boss(Boss),
}

impl SpecialFloor {
    /// The clear condition of this floor, evaluated against quest progress.
    ///
    /// New floor kinds extend this match and nothing else.
    pub fn is_satisfied(&self, quest: &QuestState) -> bool {
        match self {
            SpecialFloor::Seal(seal) => quest.has_seal(*seal),
            SpecialFloor::Boss(boss) => quest.boss_resolution(*boss).is_resolved(),
        }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, SpecialFloor::Boss(_))
    }

    pub fn is_seal(&self) -> bool {
        matches!(self, SpecialFloor::Seal(_))
    }

    /// Human-readable description of what the floor guards
    pub fn describe(&self) -> String {
        match self {
            SpecialFloor::Seal(seal) => format!("the {} Seal", seal),
            SpecialFloor::Boss(boss) => boss.to_string(),
        }
    }
}

/// Classification of floor levels into seal floors and boss floors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialFloorRegistry {
    floors: BTreeMap<u32, SpecialFloor>,
}

impl SpecialFloorRegistry {
    /// Registry with no special floors
    pub fn new() -> Self {
        Self::default()
    }

    /// The dungeon's standard layout of seal and boss floors
    pub fn standard() -> Self {
        Self::new()
            .with_seal(5, SealType::Ember)
            .with_boss(10, Boss::Warden)
            .with_seal(15, SealType::Tide)
            .with_boss(20, Boss::DrownedSaint)
            .with_seal(25, SealType::Gale)
            .with_boss(30, Boss::HollowKing)
            .with_seal(35, SealType::Stone)
            .with_boss(40, Boss::AshenChoir)
            .with_boss(50, Boss::Sleeper)
    }

    pub fn with_seal(mut self, level: u32, seal: SealType) -> Self {
        self.floors.insert(level, SpecialFloor::Seal(seal));
        self
    }

    pub fn with_boss(mut self, level: u32, boss: Boss) -> Self {
        self.floors.insert(level, SpecialFloor::Boss(boss));
        self
    }

    pub fn get(&self, level: u32) -> Option<SpecialFloor> {
        self.floors.get(&level).copied()
    }

    /// Whether leaving this floor upward requires it to be cleared first
    pub fn requires_floor_clear(&self, level: u32) -> bool {
        self.floors.contains_key(&level)
    }

    pub fn boss_for(&self, level: u32) -> Option<Boss> {
        match self.get(level) {
            Some(SpecialFloor::Boss(boss)) => Some(boss),
            _ => None,
        }
    }

    pub fn seal_for(&self, level: u32) -> Option<SealType> {
        match self.get(level) {
            Some(SpecialFloor::Seal(seal)) => Some(seal),
            _ => None,
        }
    }

    /// Special floors in ascending level order
    pub fn iter(&self) -> impl Iterator<Item = (u32, SpecialFloor)> + '_ {
        self.floors.iter().map(|(level, floor)| (*level, *floor))
    }

    /// Special floors in `low..=high`, ascending
    pub fn in_range(&self, low: u32, high: u32) -> impl Iterator<Item = (u32, SpecialFloor)> + '_ {
        self.iter()
            .filter(move |(level, _)| *level >= low && *level <= high)
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::special::quest::BossResolution;

    #[test]
    fn test_standard_layout() {
        let registry = SpecialFloorRegistry::standard();
        assert_eq!(registry.seal_for(15), Some(SealType::Tide));
        assert_eq!(registry.boss_for(10), Some(Boss::Warden));
        assert!(registry.requires_floor_clear(5));
        assert!(!registry.requires_floor_clear(6));
        let levels: Vec<u32> = registry.iter().map(|(l, _)| l).collect();
        let mut sorted = levels.clone();
        sorted.sort_unstable();
        assert_eq!(levels, sorted);
    }

    #[test]
    fn test_clear_conditions() {
        let mut quest = QuestState::new();
        let seal = SpecialFloor::Seal(SealType::Ember);
        let boss = SpecialFloor::Boss(Boss::Warden);
        assert!(!seal.is_satisfied(&quest));
        assert!(!boss.is_satisfied(&quest));

        quest.record_seal(SealType::Ember);
        quest.set_boss_resolution(Boss::Warden, BossResolution::Engaged);
        assert!(seal.is_satisfied(&quest));
        assert!(!boss.is_satisfied(&quest));

        quest.set_boss_resolution(Boss::Warden, BossResolution::Allied);
        assert!(boss.is_satisfied(&quest));
    }

    #[test]
    fn test_in_range() {
        let registry = SpecialFloorRegistry::standard();
        let hits: Vec<u32> = registry.in_range(6, 20).map(|(l, _)| l).collect();
        assert_eq!(hits, vec![10, 15, 20]);
        assert_eq!(registry.in_range(21, 3).count(), 0);
    }
}
