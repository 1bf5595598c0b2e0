//! Room exploration
//!
//! The explorer is either looking over the floor as a whole or standing in
//! one of its rooms. Entering a room marks it explored, springs its trap on
//! the first visit, resolves trivial rooms and may trigger an ambush. Room
//! actions are gated by room flags and refuse to repeat once done.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info};

use crate::action::trap;
use crate::action::{ActionResult, Direction};
use crate::dungeon::{Completion, Room, RoomId, RoomType};
use crate::gameloop::GameState;
use crate::special::encounter::{CombatOutcome, Encounters, MonsterGroup};
use crate::world::clearance::ClearanceEvaluator;

/// Where the explorer's attention is on the current floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum ExploreMode {
    /// Floor summary, not inside any room
    #[default]
    Overview,
    InRoom,
}

fn not_in_room() -> ActionResult {
    ActionResult::Failed("You are not inside a room.".to_string())
}

/// Copy of the room the explorer stands in
fn room_here(state: &GameState) -> Result<Room, ActionResult> {
    if state.mode != ExploreMode::InRoom {
        return Err(not_in_room());
    }
    state
        .floor
        .as_ref()
        .and_then(|f| f.current_room())
        .cloned()
        .ok_or_else(not_in_room)
}

fn with_room(state: &mut GameState, id: &RoomId, f: impl FnOnce(&mut Room)) {
    if let Some(room) = state.floor.as_mut().and_then(|floor| floor.room_mut(id)) {
        f(room);
    }
}

/// Step from the floor overview into a room: the remembered room if there
/// is one, else the entrance
pub fn enter_room(state: &mut GameState, encounters: &mut dyn Encounters) -> ActionResult {
    let Some(floor) = state.floor.as_ref() else {
        return ActionResult::Failed("You are not in the dungeon.".to_string());
    };
    if state.mode == ExploreMode::InRoom {
        return ActionResult::Failed("You are already inside a room.".to_string());
    }
    let id = floor
        .current_room()
        .map(|r| r.id.clone())
        .unwrap_or_else(|| floor.entrance_room_id.clone());

    state.mode = ExploreMode::InRoom;
    arrive(state, encounters, &id)
}

/// Leave the room for the floor overview
pub fn return_to_overview(state: &mut GameState) -> ActionResult {
    if state.mode != ExploreMode::InRoom {
        return not_in_room();
    }
    state.mode = ExploreMode::Overview;
    state.message("You step back and take stock of the floor.");
    ActionResult::NoTime
}

/// Walk through the exit in `dir`
pub fn do_move(
    state: &mut GameState,
    encounters: &mut dyn Encounters,
    dir: Direction,
) -> ActionResult {
    let room = match room_here(state) {
        Ok(room) => room,
        Err(fail) => return fail,
    };
    let Some(exit) = room.exit(dir) else {
        return ActionResult::Failed(format!("There is no way {} from here.", dir));
    };
    let target = exit.target.clone();
    let target_exists = state
        .floor
        .as_ref()
        .is_some_and(|f| f.room(&target).is_some());
    if !target_exists {
        panic!(
            "exit {} of room {} leads to {}, which is not on this floor",
            dir, room.id, target
        );
    }

    state.message(exit.description.clone());
    arrive(state, encounters, &target)
}

/// Everything that happens on walking into room `id`
fn arrive(state: &mut GameState, encounters: &mut dyn Encounters, id: &RoomId) -> ActionResult {
    let Some(floor) = state.floor.as_mut() else {
        return ActionResult::Failed("You are not in the dungeon.".to_string());
    };
    let level = floor.level;
    floor.current_room_id = Some(id.clone());
    let is_seal_room = floor.is_seal_room(id) && floor.has_uncollected_seal();
    let Some(room) = floor.room_mut(id) else {
        panic!("room {} is not on floor {}", id, level);
    };
    let first_visit = !room.is_explored;
    room.is_explored = true;
    let room = room.clone();

    state.message(format!("You enter the {}.", room.name));
    if first_visit {
        state.message(room.description.clone());
        trap::resolve_trap(state, encounters, id);
    }

    if !room.has_monsters && !room.is_cleared {
        with_room(state, id, |r| r.is_cleared = true);
    }

    if first_visit && is_seal_room {
        try_collect_seal(state, encounters, id);
    }

    if room.is_boss_room {
        if first_visit {
            return engage_boss(state, encounters, id);
        }
        return ActionResult::Success;
    }

    if room.has_live_monsters() {
        state.message("Something moves in the shadows.");
        if state.rng.percent(state.options.ambush_percent) {
            state.message("You are ambushed!");
            debug!(room = %id, "ambush");
            return fight_monsters(state, encounters, id);
        }
    }
    ActionResult::Success
}

/// Ask the discovery collaborator for the floor's seal
fn try_collect_seal(state: &mut GameState, encounters: &mut dyn Encounters, id: &RoomId) -> bool {
    let found = match state.floor.as_ref() {
        Some(floor) => match floor.room(id) {
            Some(room) => encounters.try_discover_collectible(floor, room),
            None => false,
        },
        None => false,
    };
    if !found {
        return false;
    }

    let Some(floor) = state.floor.as_mut() else {
        return false;
    };
    let Some(seal) = floor.seal_type else {
        return false;
    };
    floor.seal_collected = true;
    let level = floor.level;
    state.quest.record_seal(seal);
    state.message(format!("You claim the {} Seal.", seal));
    info!(level, %seal, "seal collected");
    true
}

/// Meet the floor's boss through the boss collaborator
fn engage_boss(state: &mut GameState, encounters: &mut dyn Encounters, id: &RoomId) -> ActionResult {
    let Some(floor) = state.floor.as_ref() else {
        return ActionResult::Failed("You are not in the dungeon.".to_string());
    };
    let level = floor.level;
    let Some(boss) = floor.boss.or_else(|| state.registry.boss_for(level)) else {
        return fight_monsters(state, encounters, id);
    };
    let Some(room) = floor.room(id) else {
        return ActionResult::Failed("You are not inside a room.".to_string());
    };
    let prior = state.quest.boss_resolution(boss);
    if prior.is_resolved() {
        if room.is_cleared {
            return ActionResult::Failed(format!("Your business with {} is finished.", boss));
        }
        // Settled elsewhere; the hall no longer holds anyone.
        settle_boss_room(state, id);
        state.message(format!("The hall is quiet. Your confrontation with {} ended: {}.", boss, prior));
        info!(level, %boss, resolution = %prior, "boss room settled");
        return ActionResult::Success;
    }

    let resolution = encounters.try_boss_encounter(level, boss, room);
    state.message(format!("You face {}.", boss));
    state.quest.set_boss_resolution(boss, resolution);

    let resolved = ClearanceEvaluator::new(&state.registry)
        .boss_resolved(level, &state.quest)
        .unwrap_or_else(|| state.quest.boss_resolution(boss).is_resolved());
    if resolved {
        settle_boss_room(state, id);
        state.message(format!("Your confrontation with {} ends: {}.", boss, resolution));
        info!(level, %boss, %resolution, "boss resolved");
    } else {
        state.message(format!("{} still holds this hall.", capitalize(&boss.to_string())));
    }
    ActionResult::Success
}

fn settle_boss_room(state: &mut GameState, id: &RoomId) {
    with_room(state, id, |r| r.is_cleared = true);
    if let Some(floor) = state.floor.as_mut() {
        floor.boss_defeated = true;
        floor.recount();
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Fight the ordinary monsters of room `id`
fn fight_monsters(
    state: &mut GameState,
    encounters: &mut dyn Encounters,
    id: &RoomId,
) -> ActionResult {
    let Some(room) = state.floor.as_ref().and_then(|f| f.room(id)) else {
        return not_in_room();
    };
    let name = room.name.clone();
    let is_vault = room.room_type == RoomType::SecretVault;
    let outcome = encounters.resolve_combat(room, &MonsterGroup::for_room(room));
    debug!(room = %id, %outcome, "combat resolved");

    match outcome {
        CombatOutcome::Victory => {
            with_room(state, id, |r| {
                r.is_cleared = true;
                if is_vault {
                    r.completion.insert(Completion::SECRET_BOSS_DEFEATED);
                }
            });
            if let Some(floor) = state.floor.as_mut() {
                floor.recount();
            }
            state.message(format!("The {} falls silent.", name));
            ActionResult::Success
        }
        CombatOutcome::Retreat => {
            state.message("You fall back, the monsters still prowling.");
            ActionResult::Success
        }
        CombatOutcome::Defeat => ActionResult::Died(format!("slain in the {}", name)),
    }
}

/// Fight whatever holds the current room
pub fn do_fight(state: &mut GameState, encounters: &mut dyn Encounters) -> ActionResult {
    let room = match room_here(state) {
        Ok(room) => room,
        Err(fail) => return fail,
    };
    if room.is_boss_room {
        return engage_boss(state, encounters, &room.id);
    }
    if !room.has_live_monsters() {
        return ActionResult::Failed("There is nothing to fight here.".to_string());
    }
    fight_monsters(state, encounters, &room.id)
}

/// Take the room's treasure; granted once
pub fn do_loot(state: &mut GameState, encounters: &mut dyn Encounters) -> ActionResult {
    let room = match room_here(state) {
        Ok(room) => room,
        Err(fail) => return fail,
    };
    if !room.has_treasure {
        return ActionResult::Failed("There is no treasure here.".to_string());
    }
    if room.treasure_looted {
        return ActionResult::Failed("You have already looted this room.".to_string());
    }
    if !room.is_safe() {
        return ActionResult::Failed("Monsters guard the treasure.".to_string());
    }

    let level = state.current_level;
    encounters.grant_treasure(level, &room);
    with_room(state, &room.id, |r| r.treasure_looted = true);
    if let Some(floor) = state.floor.as_mut() {
        floor.recount();
    }
    state.message("You gather up the treasure.");
    ActionResult::Success
}

/// Resolve the room's event
pub fn do_investigate(state: &mut GameState) -> ActionResult {
    let room = match room_here(state) {
        Ok(room) => room,
        Err(fail) => return fail,
    };
    let Some(event) = room.event else {
        return ActionResult::Failed("There is nothing here to investigate.".to_string());
    };
    if room.event_completed {
        return ActionResult::Failed(format!("You have already investigated the {}.", event));
    }
    if !room.is_safe() {
        return ActionResult::Failed("The monsters will not let you near it.".to_string());
    }

    with_room(state, &room.id, |r| r.event_completed = true);
    state.message(event.outcome_message());
    ActionResult::Success
}

/// Study the room's feature: the seal, lore, a memory, a riddle or a puzzle
pub fn do_examine(state: &mut GameState, encounters: &mut dyn Encounters) -> ActionResult {
    let room = match room_here(state) {
        Ok(room) => room,
        Err(fail) => return fail,
    };
    if !room.is_safe() {
        return ActionResult::Failed("You cannot study anything with monsters about.".to_string());
    }

    let holds_seal = state
        .floor
        .as_ref()
        .is_some_and(|f| f.is_seal_room(&room.id) && f.has_uncollected_seal());
    if holds_seal {
        if !try_collect_seal(state, encounters, &room.id) {
            state.message("The seal will not yield to you yet.");
        }
        return ActionResult::Success;
    }

    match room.room_type {
        RoomType::LoreLibrary => study(
            state,
            &room,
            Completion::LORE_COLLECTED,
            "You copy down a page of forgotten lore.",
        ),
        RoomType::MeditationChamber => study(
            state,
            &room,
            Completion::MEMORY_TRIGGERED,
            "In the stillness, a memory surfaces.",
        ),
        RoomType::RiddleGate | RoomType::PuzzleRoom => {
            let (flag, solved) = if room.room_type == RoomType::RiddleGate {
                (Completion::RIDDLE_ANSWERED, "The stone face smiles and falls silent.")
            } else {
                (Completion::PUZZLE_SOLVED, "The tiles click into place.")
            };
            if room.completion.contains(flag) {
                return ActionResult::Failed("You have already solved this.".to_string());
            }
            if encounters.attempt_challenge(&room) {
                with_room(state, &room.id, |r| r.completion.insert(flag));
                state.message(solved);
            } else {
                state.message("The answer eludes you.");
            }
            ActionResult::Success
        }
        _ => {
            state.message(room.description.clone());
            ActionResult::NoTime
        }
    }
}

fn study(state: &mut GameState, room: &Room, flag: Completion, msg: &str) -> ActionResult {
    if room.completion.contains(flag) {
        return ActionResult::Failed("You have learned all this room can teach.".to_string());
    }
    with_room(state, &room.id, |r| r.completion.insert(flag));
    state.message(msg);
    ActionResult::Success
}

/// Catch your breath in a safe room
pub fn do_rest(state: &mut GameState) -> ActionResult {
    let room = match room_here(state) {
        Ok(room) => room,
        Err(fail) => return fail,
    };
    if !room.is_safe() {
        return ActionResult::Failed("You cannot rest with monsters nearby.".to_string());
    }
    state.message("You rest a while.");
    ActionResult::Success
}

/// The current room has stairs down
pub fn check_stairs(state: &GameState) -> Result<(), ActionResult> {
    let room = room_here(state)?;
    if !room.has_stairs_down {
        return Err(ActionResult::Failed("There are no stairs down here.".to_string()));
    }
    Ok(())
}
