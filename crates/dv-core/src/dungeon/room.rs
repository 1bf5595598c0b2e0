//! Room types and structures
//!
//! A room is one node of a floor's graph: directional exits to other
//! rooms, content flags fixed by generation, and progress flags the
//! explorer changes and the floor state store persists.

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::action::Direction;

/// Room identifier, unique within a floor and stable across regenerations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Id of the `index`-th room generated on `level`
    pub fn new(level: u32, index: usize) -> Self {
        Self(format!("F{}-R{:02}", level, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Room types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum RoomType {
    /// Ordinary chamber
    #[default]
    Chamber,
    Shrine,
    LoreLibrary,
    SecretVault,
    MeditationChamber,
    RiddleGate,
    PuzzleRoom,
    BossRoom,
}

impl RoomType {
    /// Types rolled for ordinary rooms, in roll order
    pub const RANDOM_SPECIALS: [RoomType; 6] = [
        RoomType::SecretVault,
        RoomType::RiddleGate,
        RoomType::MeditationChamber,
        RoomType::LoreLibrary,
        RoomType::PuzzleRoom,
        RoomType::Shrine,
    ];

    /// Minimum floor level for this type to be rolled
    /// Returns None if the type is only ever placed deliberately
    pub fn min_level(self) -> Option<u32> {
        match self {
            RoomType::Chamber => Some(1),
            RoomType::Shrine => Some(1),
            RoomType::PuzzleRoom => Some(2),
            RoomType::LoreLibrary => Some(3),
            RoomType::MeditationChamber => Some(4),
            RoomType::SecretVault => Some(5),
            RoomType::RiddleGate => Some(6),
            RoomType::BossRoom => None,
        }
    }

    /// Roll chance as (numerator, denominator)
    pub fn spawn_probability(self) -> Option<(u32, u32)> {
        match self {
            RoomType::Shrine | RoomType::LoreLibrary | RoomType::PuzzleRoom => Some((1, 8)),
            RoomType::SecretVault | RoomType::MeditationChamber | RoomType::RiddleGate => {
                Some((1, 10))
            }
            RoomType::Chamber | RoomType::BossRoom => None,
        }
    }

    /// Whether monsters may be placed in a room of this type
    pub fn allows_monsters(self) -> bool {
        matches!(
            self,
            RoomType::Chamber
                | RoomType::SecretVault
                | RoomType::RiddleGate
                | RoomType::PuzzleRoom
                | RoomType::BossRoom
        )
    }

    /// Noun used when naming rooms of this type
    pub fn noun(self) -> &'static str {
        match self {
            RoomType::Chamber => "Chamber",
            RoomType::Shrine => "Shrine",
            RoomType::LoreLibrary => "Library",
            RoomType::SecretVault => "Vault",
            RoomType::MeditationChamber => "Meditation Cell",
            RoomType::RiddleGate => "Riddle Gate",
            RoomType::PuzzleRoom => "Puzzle Hall",
            RoomType::BossRoom => "Throne",
        }
    }
}

/// Kind of event a room may hold
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum EventType {
    #[default]
    Fountain,
    Altar,
    Inscription,
    WanderingSpirit,
    Cache,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Fountain,
        EventType::Altar,
        EventType::Inscription,
        EventType::WanderingSpirit,
        EventType::Cache,
    ];

    /// Message shown when the event is investigated
    pub fn outcome_message(self) -> &'static str {
        match self {
            EventType::Fountain => "You drink from the fountain and feel refreshed.",
            EventType::Altar => "You leave an offering on the altar. Something stirs approvingly.",
            EventType::Inscription => "You trace the worn inscription and commit it to memory.",
            EventType::WanderingSpirit => "The wandering spirit whispers a warning and fades.",
            EventType::Cache => "You pry open a forgotten cache of supplies.",
        }
    }
}

bitflags! {
    /// Completion flags specific to room types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Completion: u8 {
        const PUZZLE_SOLVED = 0x01;
        const RIDDLE_ANSWERED = 0x02;
        const LORE_COLLECTED = 0x04;
        const MEMORY_TRIGGERED = 0x08;
        const SECRET_BOSS_DEFEATED = 0x10;
    }
}

/// A passage out of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Room the passage leads to (always on the same floor)
    pub target: RoomId,
    /// One-line description of the passage
    pub description: String,
}

/// A room on a floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub room_type: RoomType,
    pub exits: BTreeMap<Direction, Exit>,

    // Content, fixed by generation
    pub has_monsters: bool,
    pub is_boss_room: bool,
    pub has_treasure: bool,
    pub has_trap: bool,
    pub event: Option<EventType>,
    pub has_stairs_down: bool,
    /// 0 (harmless) to 3 (deadly)
    pub danger_rating: u8,

    // Progress, persisted
    pub is_explored: bool,
    pub is_cleared: bool,
    pub treasure_looted: bool,
    pub trap_triggered: bool,
    pub event_completed: bool,
    pub completion: Completion,
}

impl Room {
    /// Create an empty chamber with no exits or content
    pub fn new(id: RoomId, name: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            room_type,
            exits: BTreeMap::new(),
            has_monsters: false,
            is_boss_room: false,
            has_treasure: false,
            has_trap: false,
            event: None,
            has_stairs_down: false,
            danger_rating: 0,
            is_explored: false,
            is_cleared: false,
            treasure_looted: false,
            trap_triggered: false,
            event_completed: false,
            completion: Completion::empty(),
        }
    }

    pub fn has_event(&self) -> bool {
        self.event.is_some()
    }

    /// Monsters are present and still undefeated
    pub fn has_live_monsters(&self) -> bool {
        self.has_monsters && !self.is_cleared
    }

    /// Room-local interactions are allowed once the room is safe
    pub fn is_safe(&self) -> bool {
        self.is_cleared || !self.has_monsters
    }

    pub fn exit(&self, dir: Direction) -> Option<&Exit> {
        self.exits.get(&dir)
    }

    /// Short kind name, e.g. for the overview
    pub fn kind_name(&self) -> String {
        self.room_type.to_string()
    }
}
