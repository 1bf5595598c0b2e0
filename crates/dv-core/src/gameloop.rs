//! Main game loop
//!
//! Explorer commands run one at a time to completion. The loop owns the
//! collaborators and the clock; everything persistent lives in `GameState`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::action::explore::{self, ExploreMode};
use crate::action::level_change::{self, LevelChangeResult};
use crate::action::{ActionResult, Command};
use crate::dungeon::{DungeonOverview, Floor, FloorSummary, Room, SpecialFloorRegistry};
use crate::rng::GameRng;
use crate::special::encounter::Encounters;
use crate::special::quest::QuestState;
use crate::world::floor_state::FloorStateStore;
use crate::world::gate::AccessibilityGate;
use crate::world::options::DungeonOptions;
use crate::world::restore::FloorRestorer;
use crate::world::time::Clock;

/// Result of a game loop tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameLoopResult {
    /// Continue playing
    Continue,
    /// Explorer died with message
    PlayerDied(String),
    /// Explorer quit
    PlayerQuit,
    /// Save and quit
    SaveAndQuit,
}

/// The explorer, as far as the floor engine cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explorer {
    pub name: String,
    /// Experience level; bounds how deep the stairs may take them
    pub level: u32,
    /// Trap evasion stat
    pub agility: u32,
}

impl Explorer {
    pub fn new(name: impl Into<String>, level: u32, agility: u32) -> Self {
        Self {
            name: name.into(),
            level: level.max(1),
            agility,
        }
    }
}

/// Main game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub explorer: Explorer,

    /// Memory of every visited floor
    pub store: FloorStateStore,

    /// Boss resolutions and seals
    #[serde(default)]
    pub quest: QuestState,

    /// Special floors known to be cleared
    #[serde(default)]
    pub cleared_special_floors: BTreeSet<u32>,

    /// Floor the explorer is on; 0 on the surface
    pub current_level: u32,

    /// Session random number generator
    pub rng: GameRng,

    /// Messages for the current command
    #[serde(skip)]
    pub messages: Vec<String>,

    /// Permanent message history
    #[serde(skip)]
    pub message_history: Vec<String>,

    #[serde(skip)]
    pub options: DungeonOptions,

    #[serde(skip, default = "SpecialFloorRegistry::standard")]
    pub registry: SpecialFloorRegistry,

    /// The live floor; rebuilt from `store` on load
    #[serde(skip)]
    pub floor: Option<Floor>,

    #[serde(skip)]
    pub mode: ExploreMode,
}

impl GameState {
    /// New explorer on the surface with the standard dungeon
    pub fn new(explorer: Explorer, rng: GameRng) -> Self {
        Self {
            explorer,
            store: FloorStateStore::new(),
            quest: QuestState::new(),
            cleared_special_floors: BTreeSet::new(),
            current_level: 0,
            rng,
            messages: Vec::new(),
            message_history: Vec::new(),
            options: DungeonOptions::default(),
            registry: SpecialFloorRegistry::standard(),
            floor: None,
            mode: ExploreMode::Overview,
        }
    }

    pub fn with_options(mut self, options: DungeonOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: SpecialFloorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add a message to display
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg_str = msg.into();
        self.messages.push(msg_str.clone());
        self.message_history.push(msg_str);
    }

    /// Clear messages
    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    pub fn in_dungeon(&self) -> bool {
        self.floor.is_some()
    }

    pub fn current_room(&self) -> Option<&Room> {
        match self.mode {
            ExploreMode::InRoom => self.floor.as_ref().and_then(|f| f.current_room()),
            ExploreMode::Overview => None,
        }
    }

    pub fn floor_summary(&self) -> Option<FloorSummary> {
        self.floor
            .as_ref()
            .map(|f| FloorSummary::of(f, &self.registry, &self.quest))
    }

    pub fn dungeon_overview(&self) -> DungeonOverview {
        DungeonOverview::from_store(&self.store, &self.registry)
    }
}

/// Game loop that processes explorer commands
pub struct GameLoop {
    state: GameState,
    encounters: Box<dyn Encounters>,
    clock: Box<dyn Clock>,
}

impl GameLoop {
    /// Create a new game loop with the given state
    pub fn new(state: GameState, encounters: Box<dyn Encounters>, clock: Box<dyn Clock>) -> Self {
        Self {
            state,
            encounters,
            clock,
        }
    }

    /// Get reference to game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Get mutable reference to game state
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Consume the game loop and return the game state
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Run one explorer command
    pub fn tick(&mut self, command: Command) -> GameLoopResult {
        self.state.clear_messages();
        debug!(?command, "command");

        match self.execute_command(command) {
            ActionResult::Success | ActionResult::NoTime => GameLoopResult::Continue,
            ActionResult::Failed(msg) => {
                self.state.message(msg);
                GameLoopResult::Continue
            }
            ActionResult::Died(msg) => {
                let now = self.clock.now();
                level_change::record_floor(&mut self.state, now);
                info!(explorer = %self.state.explorer.name, reason = %msg, "explorer died");
                GameLoopResult::PlayerDied(msg)
            }
            ActionResult::Save => GameLoopResult::SaveAndQuit,
            ActionResult::Quit => GameLoopResult::PlayerQuit,
        }
    }

    /// Execute an explorer command
    fn execute_command(&mut self, command: Command) -> ActionResult {
        let encounters = self.encounters.as_mut();
        match command {
            Command::EnterRoom => explore::enter_room(&mut self.state, encounters),
            Command::Move(dir) => explore::do_move(&mut self.state, encounters, dir),
            Command::ReturnToOverview => explore::return_to_overview(&mut self.state),
            Command::Fight => explore::do_fight(&mut self.state, encounters),
            Command::Loot => explore::do_loot(&mut self.state, encounters),
            Command::Investigate => explore::do_investigate(&mut self.state),
            Command::Examine => explore::do_examine(&mut self.state, encounters),
            Command::Rest => explore::do_rest(&mut self.state),
            Command::Descend => match explore::check_stairs(&self.state) {
                Ok(()) => self.descend().into(),
                Err(fail) => fail,
            },
            Command::ChangeLevel(target) => self.change_level(target).into(),
            Command::LeaveDungeon => self.leave_dungeon(),
            Command::FloorOverview => {
                match self.state.floor_summary() {
                    Some(summary) => {
                        for line in summary.to_string().lines() {
                            self.state.message(line.to_string());
                        }
                    }
                    None => self.state.message("You are on the surface."),
                }
                ActionResult::NoTime
            }
            Command::DungeonOverview => {
                let overview = self.state.dungeon_overview();
                for line in overview.to_string().lines() {
                    self.state.message(line.to_string());
                }
                ActionResult::NoTime
            }
            Command::Save => {
                self.snapshot();
                ActionResult::Save
            }
            Command::Quit => ActionResult::Quit,
        }
    }

    /// Enter the dungeon from the surface, asking for floor `requested`.
    ///
    /// Clearance evidence is reconciled first; the explorer then lands on
    /// the deepest floor the gate and the descent cap allow.
    pub fn enter_dungeon(&mut self, requested: u32) -> LevelChangeResult {
        if self.state.in_dungeon() {
            return LevelChangeResult::Blocked("You are already in the dungeon.".to_string());
        }
        let requested = requested.clamp(1, self.state.options.max_dungeon_level.max(1));

        let gate = AccessibilityGate::new(&self.state.registry);
        gate.reconcile_cleared(
            &mut self.state.cleared_special_floors,
            &self.state.store,
            &self.state.quest,
        );
        let gated = gate.max_accessible_floor(requested, &self.state.cleared_special_floors);
        let level = gated.min(self.state.options.descent_cap(self.state.explorer.level));

        if level < gated {
            self.state.message("You are not ready to venture that deep.");
        } else if gated < requested {
            if let Some(special) = self.state.registry.get(gated) {
                self.state.message(format!(
                    "{} bars the way deeper.",
                    capitalize(&special.describe())
                ));
            }
        }
        self.arrive_on(level);
        LevelChangeResult::Changed(level)
    }

    /// Take the stairs down; capped but never gated
    pub fn descend(&mut self) -> LevelChangeResult {
        if !self.state.in_dungeon() {
            return LevelChangeResult::Blocked("You are not in the dungeon.".to_string());
        }
        match level_change::descent_target(&self.state) {
            Ok(next) => {
                self.exit_floor();
                self.arrive_on(next);
                LevelChangeResult::Changed(next)
            }
            Err(msg) => LevelChangeResult::Blocked(msg),
        }
    }

    /// Jump to an absolute floor. From the surface this is `enter_dungeon`.
    pub fn change_level(&mut self, target: u32) -> LevelChangeResult {
        if !self.state.in_dungeon() {
            return self.enter_dungeon(target);
        }
        match level_change::change_level_target(&self.state, target) {
            Ok(level) => {
                self.exit_floor();
                self.arrive_on(level);
                LevelChangeResult::Changed(level)
            }
            Err(msg) => LevelChangeResult::Blocked(msg),
        }
    }

    /// Return to the surface
    pub fn leave_dungeon(&mut self) -> ActionResult {
        if !self.state.in_dungeon() {
            return ActionResult::Failed("You are not in the dungeon.".to_string());
        }
        self.exit_floor();
        self.state.current_level = 0;
        self.state.message("You climb back into daylight.");
        ActionResult::Success
    }

    /// Run the exit-save for the current floor; returns whether it was cleared
    pub fn exit_floor(&mut self) -> bool {
        let now = self.clock.now();
        level_change::exit_save(&mut self.state, now)
    }

    /// Record the live floor into the store and stay on it
    pub fn snapshot(&mut self) {
        let now = self.clock.now();
        level_change::record_floor(&mut self.state, now);
    }

    /// Rebuild the live floor after loading a save taken inside the dungeon
    pub fn resume(&mut self) {
        if self.state.in_dungeon() || self.state.current_level == 0 {
            return;
        }
        let level = self.state.current_level;
        self.arrive_on(level);
    }

    /// Restore `level` and make it the live floor in Overview mode
    fn arrive_on(&mut self, level: u32) {
        let now = self.clock.now();
        let restored = FloorRestorer::new(&self.state.registry, &self.state.quest, &self.state.options)
            .restore(level, self.state.store.get(level), now);

        self.state.store.insert(restored.state);
        self.state.floor = Some(restored.floor);
        self.state.current_level = level;
        self.state.mode = ExploreMode::Overview;

        self.state.message(format!("You arrive on floor {}.", level));
        if restored.did_respawn {
            self.state.message("Fresh tracks in the dust: the monsters have returned.");
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::trap::TrapEffect;
    use crate::dungeon::Boss;
    use crate::special::encounter::{CombatOutcome, MonsterGroup};
    use crate::special::quest::BossResolution;
    use crate::world::time::SimClock;
    use chrono::{TimeZone, Utc};

    struct Pacifist;

    impl Encounters for Pacifist {
        fn resolve_combat(&mut self, _room: &Room, _monsters: &MonsterGroup) -> CombatOutcome {
            CombatOutcome::Victory
        }
        fn try_boss_encounter(&mut self, _level: u32, _boss: Boss, _room: &Room) -> BossResolution {
            BossResolution::Allied
        }
        fn try_discover_collectible(&mut self, _floor: &Floor, _room: &Room) -> bool {
            true
        }
        fn apply_trap(&mut self, _room: &Room, _effect: &TrapEffect) {}
    }

    fn game(explorer_level: u32) -> (GameLoop, SimClock) {
        let clock = SimClock::starting_at(Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap());
        let state = GameState::new(Explorer::new("Wren", explorer_level, 10), GameRng::new(42));
        (GameLoop::new(state, Box::new(Pacifist), Box::new(clock.clone())), clock)
    }

    #[test]
    fn test_enter_dungeon_is_gated() {
        let (mut game, _) = game(30);
        assert_eq!(game.enter_dungeon(12), LevelChangeResult::Changed(5));
        assert_eq!(game.state().mode, ExploreMode::Overview);
        assert!(game.state().store.contains(5));
    }

    #[test]
    fn test_enter_dungeon_is_capped_by_experience() {
        let (mut game, _) = game(1);
        game.state_mut().cleared_special_floors.extend([5, 10, 15]);
        assert_eq!(game.enter_dungeon(20), LevelChangeResult::Changed(11));
    }

    #[test]
    fn test_surface_commands() {
        let (mut game, _) = game(5);
        assert_eq!(game.tick(Command::EnterRoom), GameLoopResult::Continue);
        assert_eq!(game.state().messages, vec!["You are not in the dungeon.".to_string()]);
        assert!(game.leave_dungeon().is_failed());
        game.tick(Command::ChangeLevel(3));
        assert_eq!(game.state().current_level, 3);
    }

    #[test]
    fn test_leave_and_return_keeps_progress() {
        let (mut game, clock) = game(10);
        game.enter_dungeon(2);
        game.tick(Command::EnterRoom);
        let entrance = game.state().floor.as_ref().unwrap().entrance_room_id.clone();
        game.tick(Command::LeaveDungeon);
        assert_eq!(game.state().current_level, 0);
        assert!(game.state().floor.is_none());

        clock.advance_hours(2);
        game.enter_dungeon(2);
        let floor = game.state().floor.as_ref().unwrap();
        assert!(floor.room(&entrance).unwrap().is_explored);
        assert_eq!(floor.current_room_id.as_ref(), Some(&entrance));
    }

    #[test]
    fn test_save_snapshots_without_leaving() {
        let (mut game, _) = game(10);
        game.enter_dungeon(4);
        game.tick(Command::EnterRoom);
        assert_eq!(game.tick(Command::Save), GameLoopResult::SaveAndQuit);
        assert!(game.state().in_dungeon());
        assert_eq!(game.state().store.get(4).unwrap().explored_rooms(), 1);
    }

    #[test]
    fn test_resume_rebuilds_floor() {
        let (mut game, _) = game(10);
        game.enter_dungeon(4);
        game.tick(Command::EnterRoom);
        game.snapshot();
        let mut state = game.into_state();
        state.floor = None;

        let clock = SimClock::starting_at(Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap());
        let mut game = GameLoop::new(state, Box::new(Pacifist), Box::new(clock));
        game.resume();
        assert!(game.state().in_dungeon());
        assert_eq!(game.state().floor.as_ref().unwrap().explored_count(), 1);
    }

    #[test]
    fn test_overview_commands_take_no_action() {
        let (mut game, _) = game(10);
        game.enter_dungeon(5);
        game.tick(Command::FloorOverview);
        assert!(game.state().messages[0].starts_with("Floor 5"));
        game.tick(Command::DungeonOverview);
        assert_eq!(game.state().messages[0], "=== Dungeon Overview ===");
    }
}
