//! Hooks into collaborators outside the floor engine
//!
//! Combat math, boss dialogue, collectible discovery and stat effects are
//! not part of the engine. They are reached through the `Encounters` trait
//! and report back only what the engine needs to update floor state.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::action::trap::TrapEffect;
use crate::dungeon::{Boss, Floor, Room};
use crate::special::quest::BossResolution;

/// The monsters a room holds, as far as the engine knows them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterGroup {
    pub count: u32,
    pub danger: u8,
}

impl MonsterGroup {
    /// Monster group described by a room's content flags
    pub fn for_room(room: &Room) -> Self {
        Self {
            count: 1 + room.danger_rating as u32,
            danger: room.danger_rating,
        }
    }
}

/// Outcome of an ordinary fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum CombatOutcome {
    Victory,
    Retreat,
    Defeat,
}

/// External collaborators consulted by room actions
pub trait Encounters {
    /// Fight the monsters in a room
    fn resolve_combat(&mut self, room: &Room, monsters: &MonsterGroup) -> CombatOutcome;

    /// Meet a floor's boss; returns the boss's resolution afterwards
    fn try_boss_encounter(&mut self, floor_level: u32, boss: Boss, room: &Room) -> BossResolution;

    /// Search a room for the floor's collectible; true if it was obtained
    fn try_discover_collectible(&mut self, floor: &Floor, room: &Room) -> bool;

    /// Attempt a riddle or puzzle; true if solved
    fn attempt_challenge(&mut self, _room: &Room) -> bool {
        false
    }

    /// Apply a sprung trap to the explorer
    fn apply_trap(&mut self, _room: &Room, _effect: &TrapEffect) {}

    /// Hand out a room's treasure
    fn grant_treasure(&mut self, _floor_level: u32, _room: &Room) {}
}
