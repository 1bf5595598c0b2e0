//! Clearance evaluation
//!
//! Decides whether a floor counts as cleared. Special floors defer to their
//! registry entry's condition; every other floor is cleared once all of its
//! monster rooms are.

use crate::dungeon::{Floor, SpecialFloorRegistry};
use crate::special::quest::QuestState;

/// Clearance rules for one registry
#[derive(Debug, Clone, Copy)]
pub struct ClearanceEvaluator<'a> {
    registry: &'a SpecialFloorRegistry,
}

impl<'a> ClearanceEvaluator<'a> {
    pub fn new(registry: &'a SpecialFloorRegistry) -> Self {
        Self { registry }
    }

    /// Whether the floor at `floor_level` is cleared
    pub fn is_floor_cleared(&self, floor: &Floor, floor_level: u32, quest: &QuestState) -> bool {
        match self.registry.get(floor_level) {
            Some(special) => special.is_satisfied(quest),
            None => floor.all_monster_rooms_cleared(),
        }
    }

    /// Boss predicate for a boss floor; None when the level has no boss
    pub fn boss_resolved(&self, floor_level: u32, quest: &QuestState) -> Option<bool> {
        self.registry
            .boss_for(floor_level)
            .map(|boss| quest.boss_resolution(boss).is_resolved())
    }
}
