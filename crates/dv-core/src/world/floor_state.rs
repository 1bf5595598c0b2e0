//! Floor state store
//!
//! The persistent memory of every visited floor. Only the mutable subset of
//! room state is kept here; the room graph itself is regenerated from the
//! level number and the stored flags are patched back onto it.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::dungeon::{Completion, Floor, Room, RoomId};

/// Persisted progress flags of one room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    pub is_explored: bool,
    pub is_cleared: bool,
    pub treasure_looted: bool,
    pub trap_triggered: bool,
    pub event_completed: bool,
    #[serde(default)]
    pub completion: Completion,
}

impl RoomState {
    pub fn from_room(room: &Room) -> Self {
        Self {
            is_explored: room.is_explored,
            is_cleared: room.is_cleared,
            treasure_looted: room.treasure_looted,
            trap_triggered: room.trap_triggered,
            event_completed: room.event_completed,
            completion: room.completion,
        }
    }

    /// Copy these flags onto a freshly generated room
    pub fn apply_to(&self, room: &mut Room) {
        room.is_explored = self.is_explored;
        room.is_cleared = self.is_cleared;
        room.treasure_looted = self.treasure_looted;
        room.trap_triggered = self.trap_triggered;
        room.event_completed = self.event_completed;
        room.completion = self.completion;
    }
}

/// Persisted bookkeeping for one visited floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorState {
    pub floor_level: u32,
    pub last_visited_at: DateTime<Utc>,
    pub current_room_id: Option<RoomId>,
    /// Set the first time the floor is cleared; never unset
    pub ever_cleared: bool,
    pub last_cleared_at: Option<DateTime<Utc>>,
    /// Special floor cleared for good; never respawns
    pub is_permanently_clear: bool,
    #[serde(default)]
    pub room_states: BTreeMap<RoomId, RoomState>,
}

impl FloorState {
    /// State recorded on the first visit to a floor
    pub fn new(floor_level: u32, now: DateTime<Utc>) -> Self {
        Self {
            floor_level,
            last_visited_at: now,
            current_room_id: None,
            ever_cleared: false,
            last_cleared_at: None,
            is_permanently_clear: false,
            room_states: BTreeMap::new(),
        }
    }

    /// Replace the stored room flags with the live floor's
    pub fn snapshot(&mut self, floor: &Floor) {
        self.room_states = floor
            .rooms
            .iter()
            .map(|room| (room.id.clone(), RoomState::from_room(room)))
            .collect();
        self.current_room_id = floor.current_room_id.clone();
    }

    pub fn time_since_visit(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_visited_at)
    }

    pub fn explored_rooms(&self) -> usize {
        self.room_states.values().filter(|s| s.is_explored).count()
    }

    pub fn room_state(&self, id: &RoomId) -> Option<&RoomState> {
        self.room_states.get(id)
    }
}

/// Per-explorer table of floor states keyed by level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorStateStore {
    floors: BTreeMap<u32, FloorState>,
}

impl FloorStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: u32) -> Option<&FloorState> {
        self.floors.get(&level)
    }

    pub fn get_mut(&mut self, level: u32) -> Option<&mut FloorState> {
        self.floors.get_mut(&level)
    }

    pub fn contains(&self, level: u32) -> bool {
        self.floors.contains_key(&level)
    }

    /// Store a floor state, replacing any previous one for its level
    pub fn insert(&mut self, state: FloorState) {
        self.floors.insert(state.floor_level, state);
    }

    /// Existing state for `level`, or a new one created at `now`
    pub fn get_or_create(&mut self, level: u32, now: DateTime<Utc>) -> &mut FloorState {
        self.floors
            .entry(level)
            .or_insert_with(|| FloorState::new(level, now))
    }

    /// Visited floors in ascending level order
    pub fn iter(&self) -> impl Iterator<Item = &FloorState> {
        self.floors.values()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn deepest_visited(&self) -> Option<u32> {
        self.floors.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{RoomType, SpecialFloorRegistry, generate_floor};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_room_state_roundtrip_onto_room() {
        let mut room = Room::new(RoomId::new(1, 2), "X", RoomType::PuzzleRoom);
        room.is_explored = true;
        room.trap_triggered = true;
        room.completion = Completion::PUZZLE_SOLVED;
        let state = RoomState::from_room(&room);

        let mut fresh = Room::new(RoomId::new(1, 2), "X", RoomType::PuzzleRoom);
        state.apply_to(&mut fresh);
        assert_eq!(fresh, room);
    }

    #[test]
    fn test_snapshot_covers_every_room() {
        let mut floor = generate_floor(4, &SpecialFloorRegistry::standard());
        floor.rooms[0].is_explored = true;
        floor.current_room_id = Some(floor.rooms[0].id.clone());

        let mut state = FloorState::new(4, t0());
        state.snapshot(&floor);
        assert_eq!(state.room_states.len(), floor.rooms.len());
        assert_eq!(state.explored_rooms(), 1);
        assert_eq!(state.current_room_id, floor.current_room_id);
    }

    #[test]
    fn test_get_or_create_keeps_existing() {
        let mut store = FloorStateStore::new();
        store.get_or_create(3, t0()).ever_cleared = true;
        let later = t0() + Duration::hours(5);
        let state = store.get_or_create(3, later);
        assert!(state.ever_cleared);
        assert_eq!(state.last_visited_at, t0());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_deepest_visited() {
        let mut store = FloorStateStore::new();
        assert_eq!(store.deepest_visited(), None);
        store.insert(FloorState::new(7, t0()));
        store.insert(FloorState::new(2, t0()));
        assert_eq!(store.deepest_visited(), Some(7));
        let levels: Vec<u32> = store.iter().map(|s| s.floor_level).collect();
        assert_eq!(levels, vec![2, 7]);
    }

    #[test]
    fn test_store_serializes_with_level_keys() {
        let mut store = FloorStateStore::new();
        let mut state = FloorState::new(15, t0());
        state
            .room_states
            .insert(RoomId::new(15, 0), RoomState { is_explored: true, ..Default::default() });
        store.insert(state);
        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"15\""));
        let back: FloorStateStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }
}
