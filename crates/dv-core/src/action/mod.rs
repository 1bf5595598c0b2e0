//! Explorer action system
//!
//! Commands the explorer can issue and the results they produce.

pub mod explore;
pub mod level_change;
pub mod trap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Explorer command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Movement
    EnterRoom,
    Move(Direction),
    ReturnToOverview,

    // Room actions
    Fight,
    Loot,
    Investigate,
    Examine,
    Descend,
    Rest,

    // Floor changes
    ChangeLevel(u32),
    LeaveDungeon,

    // Information
    FloorOverview,
    DungeonOverview,

    // Meta
    Save,
    Quit,
}

/// Compass direction of a room exit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Direction {
    #[strum(serialize = "north")]
    North,
    #[strum(serialize = "south")]
    South,
    #[strum(serialize = "east")]
    East,
    #[strum(serialize = "west")]
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Grid delta (dx, dy) for this direction, north is negative y
    pub const fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub const fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// Result of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// Action completed successfully
    Success,
    /// Action completed but changed nothing (informational)
    NoTime,
    /// Action was rejected with message; no state changed
    Failed(String),
    /// Explorer died
    Died(String),
    /// Game should be saved
    Save,
    /// Game should quit
    Quit,
}

impl ActionResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ActionResult::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_pair_up() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::North.to_string(), "north");
        assert_eq!(Direction::West.to_string(), "west");
    }
}
