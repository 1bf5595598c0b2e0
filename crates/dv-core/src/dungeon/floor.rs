//! Floor structure
//!
//! A floor is one level of the dungeon: an ordered list of rooms forming
//! a connected graph, plus the aggregate counters of the current visit.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::room::{Room, RoomId};
use super::special_level::{Boss, SealType};

/// Aesthetic of a floor; descriptive only
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum FloorTheme {
    #[default]
    Catacombs,
    FungalCaverns,
    SunkenHalls,
    EmberForge,
    FrozenVaults,
    Abyss,
}

impl FloorTheme {
    pub const ALL: [FloorTheme; 6] = [
        FloorTheme::Catacombs,
        FloorTheme::FungalCaverns,
        FloorTheme::SunkenHalls,
        FloorTheme::EmberForge,
        FloorTheme::FrozenVaults,
        FloorTheme::Abyss,
    ];

    /// Theme for a floor level, one theme per band of five levels
    pub fn for_level(level: u32) -> Self {
        let band = (level.saturating_sub(1) / 5) as usize;
        Self::ALL[band % Self::ALL.len()]
    }

    /// Adjectives used for room names
    pub fn adjectives(self) -> &'static [&'static str] {
        match self {
            FloorTheme::Catacombs => &["Bone-Lined", "Silent", "Dusty", "Ossuary"],
            FloorTheme::FungalCaverns => &["Glowing", "Damp", "Spore-Thick", "Rotting"],
            FloorTheme::SunkenHalls => &["Flooded", "Dripping", "Drowned", "Brackish"],
            FloorTheme::EmberForge => &["Smouldering", "Sooty", "Molten", "Cinder"],
            FloorTheme::FrozenVaults => &["Frostbitten", "Glassy", "Rimed", "Hollow"],
            FloorTheme::Abyss => &["Lightless", "Whispering", "Endless", "Unmade"],
        }
    }

    /// Words for the passages between rooms
    pub fn passages(self) -> &'static [&'static str] {
        match self {
            FloorTheme::Catacombs => &["narrow crypt corridor", "collapsed archway", "stairwell of skulls"],
            FloorTheme::FungalCaverns => &["root-choked tunnel", "slick crawlway", "mushroom grove path"],
            FloorTheme::SunkenHalls => &["waist-deep channel", "mossy causeway", "half-sunk gallery"],
            FloorTheme::EmberForge => &["ash-strewn hall", "chain-hung bridge", "furnace passage"],
            FloorTheme::FrozenVaults => &["icy ramp", "frozen colonnade", "snow-drifted door"],
            FloorTheme::Abyss => &["thread of stone", "shifting corridor", "door that should not be"],
        }
    }
}

/// A generated floor with the explorer's progress merged in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub level: u32,
    pub theme: FloorTheme,
    pub rooms: Vec<Room>,
    pub entrance_room_id: RoomId,
    /// Room the explorer stands in; None until they enter the floor
    pub current_room_id: Option<RoomId>,

    pub monsters_killed: u32,
    pub treasures_found: u32,
    pub boss_defeated: bool,

    /// Boss guarding this floor, on boss floors
    pub boss: Option<Boss>,
    /// Seal held on this floor, on seal floors
    pub seal_type: Option<SealType>,
    /// Room holding the seal
    pub seal_room_id: Option<RoomId>,
    pub seal_collected: bool,
}

impl Floor {
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| &r.id == id)
    }

    pub fn room_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| &r.id == id)
    }

    pub fn entrance(&self) -> Option<&Room> {
        self.room(&self.entrance_room_id)
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.current_room_id.as_ref().and_then(|id| self.room(id))
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room> {
        let id = self.current_room_id.clone()?;
        self.room_mut(&id)
    }

    /// A seal lies somewhere on this floor and has not been taken
    pub fn has_uncollected_seal(&self) -> bool {
        self.seal_type.is_some() && !self.seal_collected
    }

    pub fn is_seal_room(&self, id: &RoomId) -> bool {
        self.seal_room_id.as_ref() == Some(id)
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.rooms.iter().find(|r| r.is_boss_room)
    }

    /// Every room with monsters has been cleared
    pub fn all_monster_rooms_cleared(&self) -> bool {
        self.rooms
            .iter()
            .filter(|r| r.has_monsters)
            .all(|r| r.is_cleared)
    }

    pub fn explored_count(&self) -> usize {
        self.rooms.iter().filter(|r| r.is_explored).count()
    }

    pub fn cleared_count(&self) -> usize {
        self.rooms.iter().filter(|r| r.is_cleared).count()
    }

    /// Recompute the visit counters from room flags
    pub fn recount(&mut self) {
        self.monsters_killed = self
            .rooms
            .iter()
            .filter(|r| r.has_monsters && r.is_cleared)
            .count() as u32;
        self.treasures_found = self.rooms.iter().filter(|r| r.treasure_looted).count() as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::RoomType;

    fn two_room_floor() -> Floor {
        let mut a = Room::new(RoomId::new(1, 0), "A", RoomType::Chamber);
        a.is_explored = true;
        let mut b = Room::new(RoomId::new(1, 1), "B", RoomType::Chamber);
        b.has_monsters = true;
        b.treasure_looted = true;
        Floor {
            level: 1,
            theme: FloorTheme::Catacombs,
            entrance_room_id: a.id.clone(),
            rooms: vec![a, b],
            current_room_id: None,
            monsters_killed: 0,
            treasures_found: 0,
            boss_defeated: false,
            boss: None,
            seal_type: Some(SealType::Ember),
            seal_room_id: Some(RoomId::new(1, 1)),
            seal_collected: false,
        }
    }

    #[test]
    fn test_theme_bands() {
        assert_eq!(FloorTheme::for_level(1), FloorTheme::Catacombs);
        assert_eq!(FloorTheme::for_level(5), FloorTheme::Catacombs);
        assert_eq!(FloorTheme::for_level(6), FloorTheme::FungalCaverns);
        assert_eq!(FloorTheme::for_level(31), FloorTheme::Catacombs);
    }

    #[test]
    fn test_monster_clearance() {
        let mut floor = two_room_floor();
        assert!(!floor.all_monster_rooms_cleared());
        floor.rooms[1].is_cleared = true;
        assert!(floor.all_monster_rooms_cleared());
    }

    #[test]
    fn test_recount() {
        let mut floor = two_room_floor();
        floor.rooms[1].is_cleared = true;
        floor.recount();
        assert_eq!(floor.monsters_killed, 1);
        assert_eq!(floor.treasures_found, 1);
    }

    #[test]
    fn test_seal_bookkeeping() {
        let mut floor = two_room_floor();
        assert!(floor.has_uncollected_seal());
        assert!(floor.is_seal_room(&RoomId::new(1, 1)));
        floor.seal_collected = true;
        assert!(!floor.has_uncollected_seal());
    }
}
