//! Floor restoration
//!
//! Regenerates a floor from its level and merges the stored progress back
//! onto it, applying time-based respawn and repairing boss rooms whose
//! stored flags claim a clear the boss predicate does not support.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::dungeon::{Floor, SpecialFloorRegistry, generate_floor};
use crate::special::quest::QuestState;

use super::clearance::ClearanceEvaluator;
use super::floor_state::FloorState;
use super::options::DungeonOptions;

/// A live floor and its updated persistent state
#[derive(Debug, Clone)]
pub struct RestoredFloor {
    pub floor: Floor,
    /// State to write back to the store; `last_visited_at` is already now
    pub state: FloorState,
    /// Stored progress existed and was merged
    pub was_restored: bool,
    /// Monsters returned because the floor was left long enough
    pub did_respawn: bool,
}

/// Merges stored floor state onto freshly generated floors
#[derive(Debug, Clone, Copy)]
pub struct FloorRestorer<'a> {
    registry: &'a SpecialFloorRegistry,
    quest: &'a QuestState,
    options: &'a DungeonOptions,
}

impl<'a> FloorRestorer<'a> {
    pub fn new(
        registry: &'a SpecialFloorRegistry,
        quest: &'a QuestState,
        options: &'a DungeonOptions,
    ) -> Self {
        Self {
            registry,
            quest,
            options,
        }
    }

    /// Whether a floor last seen under `state` has respawned by `now`
    pub fn should_respawn(&self, state: &FloorState, now: DateTime<Utc>) -> bool {
        !state.is_permanently_clear
            && state.time_since_visit(now) >= Duration::hours(self.options.respawn_hours)
    }

    /// Build the live floor for `level`
    pub fn restore(
        &self,
        level: u32,
        stored: Option<&FloorState>,
        now: DateTime<Utc>,
    ) -> RestoredFloor {
        let mut floor = generate_floor(level, self.registry);
        let level = floor.level;

        let Some(stored) = stored else {
            self.sync_quest_flags(&mut floor);
            info!(level, "first visit to floor");
            return RestoredFloor {
                floor,
                state: FloorState::new(level, now),
                was_restored: false,
                did_respawn: false,
            };
        };

        for (id, room_state) in &stored.room_states {
            match floor.room_mut(id) {
                Some(room) => room_state.apply_to(room),
                None => warn!(
                    level,
                    room = %id,
                    "stored room state has no matching room; floor generation is not deterministic"
                ),
            }
        }

        let did_respawn = self.should_respawn(stored, now);
        if did_respawn {
            for room in &mut floor.rooms {
                room.is_cleared = false;
            }
            debug!(level, away = %stored.time_since_visit(now), "monsters respawned");
        }

        self.correct_boss_rooms(&mut floor, stored.ever_cleared);

        floor.current_room_id = match &stored.current_room_id {
            Some(id) if floor.room(id).is_some() => Some(id.clone()),
            Some(id) => {
                warn!(level, room = %id, "stored current room does not exist; placing at entrance");
                None
            }
            None => None,
        };

        self.sync_quest_flags(&mut floor);
        floor.recount();

        let mut state = stored.clone();
        state.last_visited_at = now;

        info!(level, did_respawn, "restored floor");
        RestoredFloor {
            floor,
            state,
            was_restored: true,
            did_respawn,
        }
    }

    /// A boss room stays cleared only if its boss is resolved, or, on floors
    /// without a registered boss, if the floor was ever cleared.
    fn correct_boss_rooms(&self, floor: &mut Floor, ever_cleared: bool) {
        let eval = ClearanceEvaluator::new(self.registry);
        let allowed = eval
            .boss_resolved(floor.level, self.quest)
            .unwrap_or(ever_cleared);
        if allowed {
            return;
        }
        for room in floor.rooms.iter_mut().filter(|r| r.is_boss_room && r.is_cleared) {
            warn!(level = floor.level, room = %room.id, "boss room marked cleared without a resolved boss; resetting");
            room.is_cleared = false;
        }
    }

    fn sync_quest_flags(&self, floor: &mut Floor) {
        if let Some(seal) = floor.seal_type {
            floor.seal_collected = self.quest.has_seal(seal);
        }
        if let Some(boss) = floor.boss {
            floor.boss_defeated = self.quest.boss_resolution(boss).is_resolved();
        }
    }
}
