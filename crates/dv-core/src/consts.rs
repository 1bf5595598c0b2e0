//! Core game constants
//!
//! Defaults for the tunables in `DungeonOptions` plus fixed generation limits.

/// Hours away from a floor before its monsters return
pub const RESPAWN_HOURS: i64 = 24;

/// Chance (percent) that entering a room with live monsters starts a fight
pub const AMBUSH_PERCENT: u32 = 20;

/// Deepest floor of the dungeon
pub const MAX_DUNGEON_LEVEL: u32 = 50;

/// How far below the explorer's own level they may descend
pub const DESCENT_LEAD: u32 = 10;

/// Room limits
pub const MIN_ROOMS_PER_FLOOR: usize = 6;
pub const MAX_ROOMS_PER_FLOOR: usize = 18;

/// Highest danger rating a room can carry
pub const MAX_DANGER: u8 = 3;

/// Chance (1 in N) of an extra loop passage between neighbouring rooms
pub const LOOP_EXIT_ONE_IN: u32 = 4;

/// Cap on trap evasion chance (percent)
pub const MAX_EVASION_PERCENT: u32 = 60;
