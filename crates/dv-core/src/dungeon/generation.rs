//! Floor generation
//!
//! Builds a floor's room graph from its level number. Generation draws only
//! from `GameRng::for_floor(level)`, so the same level always yields the
//! same ids, exits, room types and content flags. That is what lets the
//! floor state store keep a sparse patch instead of the whole graph.

use std::collections::VecDeque;

use hashbrown::HashMap;
use tracing::debug;

use crate::action::Direction;
use crate::consts::{LOOP_EXIT_ONE_IN, MAX_DANGER, MAX_ROOMS_PER_FLOOR, MIN_ROOMS_PER_FLOOR};
use crate::rng::GameRng;

use super::floor::{Floor, FloorTheme};
use super::room::{EventType, Exit, Room, RoomId, RoomType};
use super::special_level::SpecialFloorRegistry;

// ============================================================================
// Level scaling
// ============================================================================

/// Chance (percent) that a hostile-type room holds monsters
pub fn monster_percent(level: u32) -> u32 {
    level.saturating_mul(2).saturating_add(30).min(80)
}

/// Danger rating of an ordinary monster room before the random bump
pub fn base_danger(level: u32) -> u8 {
    (1 + level / 15).min(MAX_DANGER as u32) as u8
}

pub fn treasure_percent(level: u32) -> u32 {
    level.saturating_add(15).min(45)
}

pub fn trap_percent(level: u32) -> u32 {
    level.saturating_add(5).min(35)
}

pub fn event_percent(level: u32) -> u32 {
    (12 + level / 2).min(30)
}

fn room_count(level: u32, rng: &mut GameRng) -> usize {
    let count = MIN_ROOMS_PER_FLOOR + (level / 4) as usize + rng.rn2(3) as usize;
    count.min(MAX_ROOMS_PER_FLOOR)
}

// ============================================================================
// Layout
// ============================================================================

/// Rooms on an abstract grid and the passages between them
struct Layout {
    cells: Vec<(i32, i32)>,
    links: Vec<(usize, Direction, usize)>,
}

impl Layout {
    fn linked(&self, a: usize, b: usize) -> bool {
        self.links
            .iter()
            .any(|&(x, _, y)| (x == a && y == b) || (x == b && y == a))
    }
}

/// Grow a connected layout outward from the entrance at the origin.
///
/// Every new room is attached to an existing one, so the passages always
/// contain a spanning tree rooted at the entrance.
fn grow_layout(target: usize, rng: &mut GameRng) -> Layout {
    let mut layout = Layout {
        cells: vec![(0, 0)],
        links: Vec::new(),
    };
    let mut occupied: HashMap<(i32, i32), usize> = HashMap::new();
    occupied.insert((0, 0), 0);

    let mut attempts = 0;
    while layout.cells.len() < target && attempts < target * 64 {
        attempts += 1;
        let from = rng.rn2(layout.cells.len() as u32) as usize;
        let dir = Direction::ALL[rng.rn2(4) as usize];
        let (dx, dy) = dir.delta();
        let (x, y) = layout.cells[from];
        let pos = (x + dx, y + dy);
        if occupied.contains_key(&pos) {
            continue;
        }
        let idx = layout.cells.len();
        layout.cells.push(pos);
        occupied.insert(pos, idx);
        layout.links.push((from, dir, idx));
    }

    // Extra passages between neighbours turn the tree into a graph with loops
    for idx in 0..layout.cells.len() {
        for dir in [Direction::East, Direction::South] {
            let (dx, dy) = dir.delta();
            let (x, y) = layout.cells[idx];
            let Some(&other) = occupied.get(&(x + dx, y + dy)) else {
                continue;
            };
            if !layout.linked(idx, other) && rng.one_in(LOOP_EXIT_ONE_IN) {
                layout.links.push((idx, dir, other));
            }
        }
    }

    layout
}

/// Breadth-first distance of every room from the first room
pub fn distances_from_entrance(rooms: &[Room]) -> Vec<Option<usize>> {
    let index: HashMap<&RoomId, usize> = rooms.iter().enumerate().map(|(i, r)| (&r.id, i)).collect();
    let mut dist = vec![None; rooms.len()];
    if rooms.is_empty() {
        return dist;
    }

    let mut queue = VecDeque::new();
    dist[0] = Some(0);
    queue.push_back(0);
    while let Some(i) = queue.pop_front() {
        let d = dist[i].unwrap_or(0);
        for exit in rooms[i].exits.values() {
            if let Some(&j) = index.get(&exit.target) {
                if dist[j].is_none() {
                    dist[j] = Some(d + 1);
                    queue.push_back(j);
                }
            }
        }
    }
    dist
}

// ============================================================================
// Generation
// ============================================================================

/// Generate the floor for `level` (levels below 1 are treated as 1)
pub fn generate_floor(level: u32, registry: &SpecialFloorRegistry) -> Floor {
    let level = level.max(1);
    let mut rng = GameRng::for_floor(level);
    let theme = FloorTheme::for_level(level);

    let target = room_count(level, &mut rng);
    let layout = grow_layout(target, &mut rng);

    let mut rooms: Vec<Room> = (0..layout.cells.len())
        .map(|i| Room::new(RoomId::new(level, i), String::new(), RoomType::Chamber))
        .collect();

    for &(a, dir, b) in &layout.links {
        let passage = rng.choose(theme.passages()).copied().unwrap_or("passage");
        let to_b = Exit {
            target: rooms[b].id.clone(),
            description: format!("A {} leads {}.", passage, dir),
        };
        let to_a = Exit {
            target: rooms[a].id.clone(),
            description: format!("A {} leads {}.", passage, dir.opposite()),
        };
        rooms[a].exits.insert(dir, to_b);
        rooms[b].exits.insert(dir.opposite(), to_a);
    }

    // Far rooms first; ties broken by index so the order is stable
    let dist = distances_from_entrance(&rooms);
    let mut far: Vec<usize> = (1..rooms.len()).collect();
    far.sort_by(|&a, &b| dist[b].cmp(&dist[a]).then(a.cmp(&b)));

    let mut floor = Floor {
        level,
        theme,
        entrance_room_id: rooms[0].id.clone(),
        rooms: Vec::new(),
        current_room_id: None,
        monsters_killed: 0,
        treasures_found: 0,
        boss_defeated: false,
        boss: registry.boss_for(level),
        seal_type: registry.seal_for(level),
        seal_room_id: None,
        seal_collected: false,
    };

    if floor.boss.is_some() && !far.is_empty() {
        let idx = far.remove(0);
        let room = &mut rooms[idx];
        room.room_type = RoomType::BossRoom;
        room.is_boss_room = true;
        room.has_monsters = true;
        room.has_treasure = true;
        room.danger_rating = MAX_DANGER;
    }

    if floor.seal_type.is_some() && !far.is_empty() {
        let idx = far.remove(0);
        let room = &mut rooms[idx];
        room.room_type = RoomType::Shrine;
        room.has_monsters = true;
        room.danger_rating = base_danger(level);
        floor.seal_room_id = Some(room.id.clone());
    }

    if !far.is_empty() {
        let pool = &far[..far.len().div_ceil(2)];
        if let Some(&idx) = rng.choose(pool) {
            rooms[idx].has_stairs_down = true;
        }
    }

    for &idx in &far {
        populate_room(&mut rooms[idx], level, &mut rng);
    }

    for (idx, room) in rooms.iter_mut().enumerate() {
        let adjective = rng.choose(theme.adjectives()).copied().unwrap_or("Quiet");
        room.name = if idx == 0 {
            format!("{} Landing", adjective)
        } else {
            format!("{} {}", adjective, room.room_type.noun())
        };
        room.description = describe_room(room, floor.seal_room_id.as_ref() == Some(&room.id));
    }

    debug!(
        level,
        rooms = rooms.len(),
        theme = %theme,
        boss = floor.boss.is_some(),
        seal = floor.seal_type.is_some(),
        "generated floor"
    );

    floor.rooms = rooms;
    floor
}

/// Roll type and content for an ordinary (non-entrance, non-special) room
fn populate_room(room: &mut Room, level: u32, rng: &mut GameRng) {
    for ty in RoomType::RANDOM_SPECIALS {
        let (Some(min), Some((num, den))) = (ty.min_level(), ty.spawn_probability()) else {
            continue;
        };
        if level >= min && rng.rn2(den) < num {
            room.room_type = ty;
            break;
        }
    }

    room.has_monsters = match room.room_type {
        RoomType::SecretVault => true,
        ty if ty.allows_monsters() => rng.percent(monster_percent(level)),
        _ => false,
    };
    if room.has_monsters {
        let bump = u8::from(rng.one_in(4));
        room.danger_rating = (base_danger(level) + bump).min(MAX_DANGER);
    }

    room.has_treasure =
        room.room_type == RoomType::SecretVault || rng.percent(treasure_percent(level));
    room.has_trap = rng.percent(trap_percent(level));
    if room.room_type == RoomType::Chamber && rng.percent(event_percent(level)) {
        room.event = rng.choose(&EventType::ALL).copied();
    }
}

fn describe_room(room: &Room, holds_seal: bool) -> String {
    let mut parts = vec![match room.room_type {
        RoomType::Chamber => "A bare chamber of worked stone.",
        RoomType::Shrine => "A small shrine, its candles long cold.",
        RoomType::LoreLibrary => "Shelves of crumbling books line the walls.",
        RoomType::SecretVault => "A hidden vault behind a false wall.",
        RoomType::MeditationChamber => "A circular cell with a worn cushion at its centre.",
        RoomType::RiddleGate => "A great door carved with a questioning face.",
        RoomType::PuzzleRoom => "Tiles of many colours cover the floor in a strange pattern.",
        RoomType::BossRoom => "A vast hall. Something enormous has made its lair here.",
    }];
    if holds_seal {
        parts.push("A seal glows faintly upon the altar.");
    }
    if room.has_monsters && !room.is_boss_room {
        parts.push("Claw marks score the walls.");
    }
    if room.has_treasure {
        parts.push("A glint of gold catches your eye.");
    }
    if let Some(event) = room.event {
        parts.push(match event {
            EventType::Fountain => "A fountain burbles in the corner.",
            EventType::Altar => "An altar stands against the far wall.",
            EventType::Inscription => "Words are carved into the lintel.",
            EventType::WanderingSpirit => "A pale figure drifts between the pillars.",
            EventType::Cache => "A loose flagstone looks recently disturbed.",
        });
    }
    if room.has_stairs_down {
        parts.push("Stairs spiral down into darkness.");
    }
    parts.join(" ")
}
