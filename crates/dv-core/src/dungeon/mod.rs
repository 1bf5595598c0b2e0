//! Dungeon system
//!
//! Contains the room graph, floor generation, special floors and overviews.

mod floor;
mod generation;
mod overview;
mod room;
mod special_level;

pub use floor::{Floor, FloorTheme};
pub use generation::{
    base_danger, distances_from_entrance, event_percent, generate_floor, monster_percent,
    treasure_percent, trap_percent,
};
pub use overview::{DungeonOverview, FloorSummary, OverviewEntry};
pub use room::{Completion, EventType, Exit, Room, RoomId, RoomType};
pub use special_level::{Boss, SealType, SpecialFloor, SpecialFloorRegistry};
