//! Auto-explore: built-in collaborators and a simple exploring policy
//!
//! Everything here is driven by a seeded `GameRng`, so the same seed,
//! options and save always produce the same session.

use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use dv_core::action::trap::TrapEffect;
use dv_core::action::{Command, Direction};
use dv_core::dungeon::{Boss, Floor, Room, RoomId, RoomType};
use dv_core::special::{BossResolution, CombatOutcome, Encounters, MonsterGroup};
use dv_core::{GameRng, GameState};

/// Fights given up after this many retreats
const MAX_FIGHTS_PER_ROOM: u32 = 3;

/// Dice-rolling stand-ins for combat, bosses and discovery
pub struct AutoEncounters {
    rng: GameRng,
    /// Explorer experience level; tilts fights in their favour
    explorer_level: u32,
}

impl AutoEncounters {
    pub fn new(seed: u64, explorer_level: u32) -> Self {
        Self {
            rng: GameRng::new(seed),
            explorer_level,
        }
    }
}

impl Encounters for AutoEncounters {
    fn resolve_combat(&mut self, room: &Room, monsters: &MonsterGroup) -> CombatOutcome {
        let edge = (self.explorer_level * 2).min(20);
        let win = (85 + edge).saturating_sub(10 * monsters.danger as u32).min(97);
        let roll = self.rng.rn2(100);
        let outcome = if roll < win {
            CombatOutcome::Victory
        } else if roll < 99 {
            CombatOutcome::Retreat
        } else {
            CombatOutcome::Defeat
        };
        debug!(room = %room.id, count = monsters.count, %outcome, "combat");
        outcome
    }

    fn try_boss_encounter(&mut self, floor_level: u32, boss: Boss, _room: &Room) -> BossResolution {
        const ENDINGS: [BossResolution; 5] = [
            BossResolution::Defeated,
            BossResolution::Saved,
            BossResolution::Allied,
            BossResolution::Awakened,
            BossResolution::Consumed,
        ];
        let resolution = if self.rng.percent(60) {
            ENDINGS[self.rng.rn2(ENDINGS.len() as u32) as usize]
        } else {
            BossResolution::Engaged
        };
        info!(floor_level, %boss, %resolution, "boss encounter");
        resolution
    }

    fn try_discover_collectible(&mut self, floor: &Floor, _room: &Room) -> bool {
        let found = self.rng.percent(50);
        debug!(level = floor.level, found, "seal search");
        found
    }

    fn attempt_challenge(&mut self, _room: &Room) -> bool {
        self.rng.percent(50)
    }

    fn apply_trap(&mut self, room: &Room, effect: &TrapEffect) {
        debug!(room = %room.id, ?effect, "trap sprung");
    }

    fn grant_treasure(&mut self, floor_level: u32, room: &Room) {
        info!(floor_level, room = %room.id, "treasure granted");
    }
}

/// Picks the next command for an explorer who wants to see everything
#[derive(Debug, Default)]
pub struct AutoPilot {
    fights: HashMap<RoomId, u32>,
    examined: HashSet<RoomId>,
    /// Floor a descent was last tried from
    descend_tried: Option<u32>,
}

impl AutoPilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next command, or `None` once the floor has nothing left to offer
    pub fn choose(&mut self, state: &GameState) -> Option<Command> {
        let floor = state.floor.as_ref()?;
        let Some(room) = state.current_room() else {
            return Some(Command::EnterRoom);
        };

        if room.has_live_monsters() {
            let fights = self.fights.entry(room.id.clone()).or_insert(0);
            if *fights < MAX_FIGHTS_PER_ROOM {
                *fights += 1;
                return Some(Command::Fight);
            }
        }

        if room.is_safe() {
            if room.has_treasure && !room.treasure_looted {
                return Some(Command::Loot);
            }
            if room.event.is_some() && !room.event_completed {
                return Some(Command::Investigate);
            }
            if worth_examining(floor, room) && self.examined.insert(room.id.clone()) {
                return Some(Command::Examine);
            }
        }

        if let Some(dir) = first_step(floor, &room.id, |r| !r.is_explored) {
            return Some(Command::Move(dir));
        }
        if room.has_stairs_down {
            if self.descend_tried == Some(floor.level) {
                return None;
            }
            self.descend_tried = Some(floor.level);
            return Some(Command::Descend);
        }
        first_step(floor, &room.id, |r| r.has_stairs_down).map(Command::Move)
    }
}

fn worth_examining(floor: &Floor, room: &Room) -> bool {
    if floor.is_seal_room(&room.id) && floor.has_uncollected_seal() {
        return true;
    }
    matches!(
        room.room_type,
        RoomType::LoreLibrary | RoomType::MeditationChamber | RoomType::RiddleGate | RoomType::PuzzleRoom
    )
}

/// First direction on a shortest path from `from` to the nearest other room
/// matching `wanted`
pub fn first_step(floor: &Floor, from: &RoomId, wanted: impl Fn(&Room) -> bool) -> Option<Direction> {
    let mut seen: HashSet<&RoomId> = HashSet::new();
    let mut queue: VecDeque<(&RoomId, Direction)> = VecDeque::new();
    seen.insert(from);

    let start = floor.room(from)?;
    for (dir, exit) in &start.exits {
        if seen.insert(&exit.target) {
            queue.push_back((&exit.target, *dir));
        }
    }

    while let Some((id, first)) = queue.pop_front() {
        let Some(room) = floor.room(id) else {
            continue;
        };
        if wanted(room) {
            return Some(first);
        }
        for exit in room.exits.values() {
            if seen.insert(&exit.target) {
                queue.push_back((&exit.target, first));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dv_core::dungeon::{SpecialFloorRegistry, generate_floor};
    use dv_core::world::SimClock;
    use dv_core::{Explorer, GameLoop, GameLoopResult};

    #[test]
    fn test_first_step_reaches_every_room() {
        let registry = SpecialFloorRegistry::standard();
        let floor = generate_floor(7, &registry);
        let entrance = floor.entrance_room_id.clone();
        for room in floor.rooms.iter().filter(|r| r.id != entrance) {
            let target = room.id.clone();
            assert!(first_step(&floor, &entrance, |r| r.id == target).is_some());
        }
        assert!(first_step(&floor, &entrance, |_| false).is_none());
    }

    #[test]
    fn test_pilot_explores_whole_floor() {
        let clock = SimClock::starting_at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let state = GameState::new(Explorer::new("Pilot", 20, 10), GameRng::new(5));
        let mut game = GameLoop::new(state, Box::new(AutoEncounters::new(5, 20)), Box::new(clock));
        game.enter_dungeon(3);

        let mut pilot = AutoPilot::new();
        for _ in 0..400 {
            if game.state().current_level != 3 {
                break;
            }
            let Some(command) = pilot.choose(game.state()) else {
                break;
            };
            if let GameLoopResult::PlayerDied(_) = game.tick(command) {
                return;
            }
        }

        let explored_all = game.state().current_level != 3
            || game
                .state()
                .floor
                .as_ref()
                .is_some_and(|f| f.rooms.iter().all(|r| r.is_explored));
        assert!(explored_all);
    }

    #[test]
    fn test_encounters_are_deterministic() {
        let registry = SpecialFloorRegistry::standard();
        let floor = generate_floor(10, &registry);
        let room = floor.boss_room().unwrap();

        let mut a = AutoEncounters::new(9, 5);
        let mut b = AutoEncounters::new(9, 5);
        for _ in 0..20 {
            assert_eq!(
                a.try_boss_encounter(10, Boss::Warden, room),
                b.try_boss_encounter(10, Boss::Warden, room)
            );
            let group = MonsterGroup::for_room(room);
            assert_eq!(a.resolve_combat(room, &group), b.resolve_combat(room, &group));
        }
    }
}
