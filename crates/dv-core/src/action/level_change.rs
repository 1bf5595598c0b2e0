//! Level change actions
//!
//! Where a descent or a jump may take the explorer, and the exit-save that
//! runs whenever they leave a floor.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::action::ActionResult;
use crate::gameloop::GameState;
use crate::world::clearance::ClearanceEvaluator;
use crate::world::gate::AccessibilityGate;

/// Result of attempting a level change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelChangeResult {
    /// Now standing on this floor
    Changed(u32),
    /// Cannot go there (message included)
    Blocked(String),
}

impl LevelChangeResult {
    pub fn is_changed(&self) -> bool {
        matches!(self, LevelChangeResult::Changed(_))
    }
}

impl From<LevelChangeResult> for ActionResult {
    fn from(result: LevelChangeResult) -> Self {
        match result {
            LevelChangeResult::Changed(_) => ActionResult::Success,
            LevelChangeResult::Blocked(msg) => ActionResult::Failed(msg),
        }
    }
}

/// Floor reached by taking the stairs down. Never gated by special floors,
/// only by the depth of the dungeon and the explorer's experience.
pub fn descent_target(state: &GameState) -> Result<u32, String> {
    let next = state.current_level.saturating_add(1);
    if next > state.options.max_dungeon_level {
        return Err("There is nothing deeper than this floor.".to_string());
    }
    let cap = state.options.descent_cap(state.explorer.level);
    if next > cap {
        return Err(format!(
            "A pressure in your chest warns you not to go below floor {}.",
            cap
        ));
    }
    Ok(next)
}

/// Floor reached by asking for `target` from the current floor.
///
/// Deeper jumps stop at the first uncleared special floor and at the
/// descent cap. Climbing is refused while an uncleared special floor lies
/// between the target (exclusive) and the current floor (inclusive).
pub fn change_level_target(state: &GameState, target: u32) -> Result<u32, String> {
    let current = state.current_level;
    if target == 0 {
        return Err("Use the way out to return to the surface.".to_string());
    }
    if target == current {
        return Err(format!("You are already on floor {}.", current));
    }

    let gate = AccessibilityGate::new(&state.registry);
    if target < current {
        if let Some((level, special)) =
            gate.ascent_blocker(current, target, &state.cleared_special_floors, &state.quest)
        {
            return Err(format!(
                "You cannot climb past floor {} until {} is dealt with.",
                level,
                special.describe()
            ));
        }
        return Ok(target);
    }

    let wanted = target.min(state.options.max_dungeon_level);
    let reachable = gate
        .max_accessible_floor(wanted, &state.cleared_special_floors)
        .min(state.options.descent_cap(state.explorer.level));
    if reachable <= current {
        return Err(format!("The way below floor {} is barred to you.", current));
    }
    Ok(reachable)
}

/// Record the live floor into the store without leaving it.
///
/// Evaluates clearance: the first clear sets `ever_cleared` and
/// `last_cleared_at`; a cleared special floor becomes permanently clear and
/// joins the cleared set. Every room's flags and the current room are
/// snapshotted. Returns whether the floor counts as cleared.
pub fn record_floor(state: &mut GameState, now: DateTime<Utc>) -> bool {
    let Some(floor) = state.floor.as_ref() else {
        return false;
    };
    let level = floor.level;
    let cleared = ClearanceEvaluator::new(&state.registry).is_floor_cleared(floor, level, &state.quest);
    let special = state.registry.requires_floor_clear(level);

    let fs = state.store.get_or_create(level, now);
    if cleared && !fs.ever_cleared {
        fs.ever_cleared = true;
        fs.last_cleared_at = Some(now);
        info!(level, "floor cleared");
    }
    if cleared && special && !fs.is_permanently_clear {
        fs.is_permanently_clear = true;
        info!(level, "special floor permanently cleared");
    }
    fs.snapshot(floor);
    fs.last_visited_at = now;

    if cleared && special {
        state.cleared_special_floors.insert(level);
    }
    cleared
}

/// The exit-save: record the floor, then drop the live floor
pub fn exit_save(state: &mut GameState, now: DateTime<Utc>) -> bool {
    let cleared = record_floor(state, now);
    if let Some(floor) = state.floor.take() {
        info!(level = floor.level, cleared, "left floor");
    }
    state.mode = Default::default();
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{SealType, SpecialFloorRegistry, generate_floor};
    use crate::gameloop::Explorer;
    use crate::rng::GameRng;
    use chrono::TimeZone;

    fn on_floor(level: u32, explorer_level: u32) -> GameState {
        let mut state = GameState::new(Explorer::new("Ash", explorer_level, 5), GameRng::new(3));
        state.current_level = level;
        state.floor = Some(generate_floor(level, &state.registry));
        state
    }

    #[test]
    fn test_descent_ignores_special_floors() {
        let state = on_floor(5, 10);
        assert_eq!(descent_target(&state), Ok(6));
    }

    #[test]
    fn test_descent_cap() {
        let state = on_floor(11, 1);
        assert!(descent_target(&state).is_err());
        let state = on_floor(50, 50);
        assert!(descent_target(&state).is_err());
    }

    #[test]
    fn test_jump_down_is_gated() {
        let state = on_floor(3, 20);
        assert_eq!(change_level_target(&state, 9), Ok(5));

        let state = on_floor(5, 20);
        assert!(change_level_target(&state, 9).is_err());

        let mut state = on_floor(5, 20);
        state.cleared_special_floors.insert(5);
        assert_eq!(change_level_target(&state, 25), Ok(10));
    }

    #[test]
    fn test_climb_blocked_by_current_special_floor() {
        let state = on_floor(5, 10);
        assert!(change_level_target(&state, 4).is_err());

        let mut state = on_floor(5, 10);
        state.quest.record_seal(SealType::Ember);
        assert_eq!(change_level_target(&state, 4), Ok(4));
    }

    #[test]
    fn test_climb_through_uncleared_special_floor() {
        let mut state = on_floor(7, 10);
        assert!(change_level_target(&state, 2).is_err());
        state.cleared_special_floors.insert(5);
        assert_eq!(change_level_target(&state, 2), Ok(2));
    }

    #[test]
    fn test_exit_save_marks_special_floor_permanent() {
        let mut state = on_floor(5, 10);
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        assert!(!exit_save(&mut state, now));
        assert!(state.floor.is_none());
        let fs = state.store.get(5).unwrap();
        assert!(!fs.ever_cleared);
        assert_eq!(fs.room_states.len(), generate_floor(5, &SpecialFloorRegistry::standard()).rooms.len());

        state.floor = Some(generate_floor(5, &state.registry));
        state.quest.record_seal(SealType::Ember);
        assert!(exit_save(&mut state, now));
        let fs = state.store.get(5).unwrap();
        assert!(fs.ever_cleared);
        assert!(fs.is_permanently_clear);
        assert_eq!(fs.last_cleared_at, Some(now));
        assert!(state.cleared_special_floors.contains(&5));
    }

    #[test]
    fn test_ordinary_floor_clear_is_not_permanent() {
        let mut state = on_floor(2, 10);
        if let Some(floor) = state.floor.as_mut() {
            for room in &mut floor.rooms {
                room.is_cleared = true;
            }
        }
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        assert!(exit_save(&mut state, now));
        let fs = state.store.get(2).unwrap();
        assert!(fs.ever_cleared);
        assert!(!fs.is_permanently_clear);
        assert!(state.cleared_special_floors.is_empty());
    }
}
