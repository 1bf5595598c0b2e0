//! Floor and dungeon overviews
//!
//! What the explorer knows about the current floor while standing outside
//! its rooms, and a line per visited floor for the whole dungeon.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::special::quest::QuestState;
use crate::world::floor_state::FloorStateStore;
use crate::world::time::format_timestamp;

use super::floor::{Floor, FloorTheme};
use super::special_level::{SpecialFloor, SpecialFloorRegistry};

/// Display data for Overview mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSummary {
    pub level: u32,
    pub theme: FloorTheme,
    pub rooms_total: usize,
    pub rooms_explored: usize,
    pub rooms_cleared: usize,
    /// Explored rooms whose treasure is still there
    pub known_treasure: usize,
    /// Stairs down have been seen
    pub stairs_found: bool,
    pub special: Option<SpecialFloor>,
    /// The special floor's condition holds
    pub special_cleared: bool,
}

impl FloorSummary {
    pub fn of(floor: &Floor, registry: &SpecialFloorRegistry, quest: &QuestState) -> Self {
        let special = registry.get(floor.level);
        Self {
            level: floor.level,
            theme: floor.theme,
            rooms_total: floor.rooms.len(),
            rooms_explored: floor.explored_count(),
            rooms_cleared: floor.cleared_count(),
            known_treasure: floor
                .rooms
                .iter()
                .filter(|r| r.is_explored && r.has_treasure && !r.treasure_looted)
                .count(),
            stairs_found: floor.rooms.iter().any(|r| r.is_explored && r.has_stairs_down),
            special,
            special_cleared: special.is_some_and(|s| s.is_satisfied(quest)),
        }
    }
}

impl fmt::Display for FloorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Floor {} ({})", self.level, self.theme)?;
        writeln!(
            f,
            "  Rooms explored: {}/{}, cleared: {}",
            self.rooms_explored, self.rooms_total, self.rooms_cleared
        )?;
        if self.known_treasure > 0 {
            writeln!(f, "  Treasure left behind: {}", self.known_treasure)?;
        }
        if self.stairs_found {
            writeln!(f, "  Stairs down found")?;
        }
        if let Some(special) = &self.special {
            let status = if self.special_cleared { "resolved" } else { "unresolved" };
            writeln!(f, "  Guarded by {} ({})", special.describe(), status)?;
        }
        Ok(())
    }
}

/// One visited floor in the dungeon overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewEntry {
    pub level: u32,
    pub ever_cleared: bool,
    pub permanently_clear: bool,
    pub last_visited_at: DateTime<Utc>,
    pub rooms_explored: usize,
    pub special: Option<SpecialFloor>,
}

impl OverviewEntry {
    /// Worth a line of its own even when nothing was explored
    pub fn is_interesting(&self) -> bool {
        self.rooms_explored > 0 || self.ever_cleared || self.special.is_some()
    }
}

/// The explorer's memory of every visited floor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonOverview {
    pub entries: Vec<OverviewEntry>,
}

impl DungeonOverview {
    pub fn from_store(store: &FloorStateStore, registry: &SpecialFloorRegistry) -> Self {
        let entries = store
            .iter()
            .map(|state| OverviewEntry {
                level: state.floor_level,
                ever_cleared: state.ever_cleared,
                permanently_clear: state.is_permanently_clear,
                last_visited_at: state.last_visited_at,
                rooms_explored: state.explored_rooms(),
                special: registry.get(state.floor_level),
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, level: u32) -> Option<&OverviewEntry> {
        self.entries.iter().find(|e| e.level == level)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for DungeonOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dungeon Overview ===")?;
        if self.entries.is_empty() {
            return writeln!(f, "  No floors visited.");
        }
        for entry in self.entries.iter().filter(|e| e.is_interesting()) {
            write!(f, "  Floor {:>2}: {} rooms explored", entry.level, entry.rooms_explored)?;
            if let Some(special) = &entry.special {
                write!(f, ", {}", special.describe())?;
            }
            if entry.permanently_clear {
                write!(f, ", cleared for good")?;
            } else if entry.ever_cleared {
                write!(f, ", cleared")?;
            }
            writeln!(f, " (last visited {})", format_timestamp(entry.last_visited_at))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{SealType, generate_floor};
    use crate::world::floor_state::FloorState;
    use chrono::TimeZone;

    #[test]
    fn test_floor_summary_counts_known_things_only() {
        let registry = SpecialFloorRegistry::standard();
        let mut quest = QuestState::new();
        let mut floor = generate_floor(5, &registry);
        let summary = FloorSummary::of(&floor, &registry, &quest);
        assert_eq!(summary.rooms_explored, 0);
        assert_eq!(summary.known_treasure, 0);
        assert!(!summary.stairs_found);
        assert_eq!(summary.special, Some(SpecialFloor::Seal(SealType::Ember)));
        assert!(!summary.special_cleared);

        for room in &mut floor.rooms {
            room.is_explored = true;
        }
        quest.record_seal(SealType::Ember);
        let summary = FloorSummary::of(&floor, &registry, &quest);
        assert_eq!(summary.rooms_explored, summary.rooms_total);
        assert!(summary.stairs_found);
        assert!(summary.special_cleared);
        assert!(summary.to_string().contains("the Ember Seal (resolved)"));
    }

    #[test]
    fn test_dungeon_overview_lists_visited_floors() {
        let registry = SpecialFloorRegistry::standard();
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 0).unwrap();
        let mut store = FloorStateStore::new();
        let mut five = FloorState::new(5, at);
        five.ever_cleared = true;
        five.is_permanently_clear = true;
        store.insert(five);
        store.insert(FloorState::new(2, at));

        let overview = DungeonOverview::from_store(&store, &registry);
        assert_eq!(overview.entries.len(), 2);
        assert_eq!(overview.entries[0].level, 2);
        assert!(!overview.entries[0].is_interesting());
        assert!(overview.entry(5).unwrap().permanently_clear);

        let text = overview.to_string();
        assert!(text.contains("Floor  5: 0 rooms explored, the Ember Seal, cleared for good"));
        assert!(!text.contains("Floor  2"));
    }
}
