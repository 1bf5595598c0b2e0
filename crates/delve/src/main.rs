//! Delve: a floor-by-floor dungeon crawl
//!
//! Command-line driver for the floor engine. Prints generated floors and
//! saved dungeon overviews, and runs deterministic auto-explore sessions.

mod auto;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::Parser;
use strum::IntoEnumIterator;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dv_core::action::{Command, Direction};
use dv_core::dungeon::{FloorSummary, Room, SpecialFloorRegistry, generate_floor};
use dv_core::special::QuestState;
use dv_core::world::{DungeonOptions, SimClock, time::format_timestamp};
use dv_core::{Explorer, GameLoop, GameLoopResult, GameRng, GameState};
use dv_save::{default_save_path, load_game, load_header, save_exists, save_game};

use auto::{AutoEncounters, AutoPilot};

/// Delve - explore the dungeon one floor at a time
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Delve - explore the dungeon one floor at a time", long_about = None)]
struct Args {
    /// Explorer name; also names the save file
    #[arg(short = 'u', long = "name", default_value = "Explorer")]
    name: String,

    /// Experience level of a new explorer
    #[arg(short = 'l', long = "level", default_value_t = 1)]
    level: u32,

    /// Agility of a new explorer
    #[arg(long = "agility", default_value_t = 5)]
    agility: u32,

    /// Floor to enter, or to print
    #[arg(short = 's', long = "start", default_value_t = 1)]
    start: u32,

    /// Print the dungeon overview of the saved game
    #[arg(short = 'o', long = "overview")]
    overview: bool,

    /// Auto-explore for up to this many commands, then save
    #[arg(short = 'x', long = "explore", value_name = "STEPS")]
    explore: Option<u32>,

    /// Hours that pass before the session starts
    #[arg(long = "wait", default_value_t = 0)]
    wait: i64,

    /// Seed for a new game and for the auto-explore collaborators
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Options file (OPTIONS= lines)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Save file to use instead of the per-explorer default
    #[arg(long = "save")]
    save: Option<PathBuf>,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = match &args.config {
        Some(path) => DungeonOptions::load_from_file(path)
            .with_context(|| format!("reading options from {}", path.display()))?,
        None => DungeonOptions::default(),
    };
    debug!(?options, "options");

    let save_path = args
        .save
        .clone()
        .unwrap_or_else(|| default_save_path(&args.name));

    if args.overview {
        return print_overview(&save_path);
    }
    if let Some(steps) = args.explore {
        return run_session(&args, options, &save_path, steps);
    }
    print_floor(args.start, &options);
    Ok(())
}

/// Print the freshly generated layout of a floor
fn print_floor(level: u32, options: &DungeonOptions) {
    let level = level.clamp(1, options.max_dungeon_level.max(1));
    let registry = SpecialFloorRegistry::standard();
    let mut floor = generate_floor(level, &registry);
    for room in &mut floor.rooms {
        room.is_explored = true;
    }

    print!("{}", FloorSummary::of(&floor, &registry, &QuestState::new()));
    for room in &floor.rooms {
        println!("  {}", describe_room(room));
        for dir in Direction::iter() {
            if let Some(exit) = room.exit(dir) {
                println!("      {:<5} -> {}", dir, exit.target);
            }
        }
    }
}

fn describe_room(room: &Room) -> String {
    let mut tags = Vec::new();
    if room.is_boss_room {
        tags.push("boss".to_string());
    } else if room.has_monsters {
        tags.push(format!("monsters (danger {})", room.danger_rating));
    }
    if room.has_treasure {
        tags.push("treasure".to_string());
    }
    if room.has_trap {
        tags.push("trap".to_string());
    }
    if let Some(event) = room.event {
        tags.push(event.to_string());
    }
    if room.has_stairs_down {
        tags.push("stairs down".to_string());
    }

    let mut line = format!("{} {} [{}]", room.id, room.name, room.kind_name());
    if !tags.is_empty() {
        line.push_str(": ");
        line.push_str(&tags.join(", "));
    }
    line
}

/// Print what a save file remembers of the dungeon
fn print_overview(save_path: &Path) -> Result<()> {
    if !save_exists(save_path) {
        bail!("no saved game at {}", save_path.display());
    }
    let header = load_header(save_path)
        .with_context(|| format!("reading save header from {}", save_path.display()))?;
    let state = load_game(save_path)
        .with_context(|| format!("loading save from {}", save_path.display()))?;

    let whereabouts = match header.current_level {
        0 => "on the surface".to_string(),
        level => format!("on floor {}", level),
    };
    println!(
        "{} (level {}), {}, saved {}",
        header.player_name,
        state.explorer.level,
        whereabouts,
        format_timestamp(header.timestamp)
    );
    print!("{}", state.dungeon_overview());
    if !state.cleared_special_floors.is_empty() {
        let cleared: Vec<String> = state
            .cleared_special_floors
            .iter()
            .map(|level| level.to_string())
            .collect();
        println!("Special floors cleared: {}", cleared.join(", "));
    }
    Ok(())
}

/// Load or create a game, let the pilot explore, then save
fn run_session(args: &Args, options: DungeonOptions, save_path: &Path, steps: u32) -> Result<()> {
    let mut state = if save_exists(save_path) {
        load_game(save_path).with_context(|| format!("loading save from {}", save_path.display()))?
    } else {
        let rng = args.seed.map(GameRng::new).unwrap_or_else(GameRng::from_entropy);
        info!(name = %args.name, "new explorer");
        GameState::new(Explorer::new(args.name.clone(), args.level, args.agility), rng)
    };
    state.options = options;

    let seed = args.seed.unwrap_or_else(|| state.rng.seed());
    let clock = SimClock::starting_at(Utc::now() + Duration::hours(args.wait));
    let encounters = AutoEncounters::new(seed, state.explorer.level);
    let mut game = GameLoop::new(state, Box::new(encounters), Box::new(clock.clone()));

    game.resume();
    if !game.state().in_dungeon() {
        game.enter_dungeon(args.start);
    }
    print_messages(game.state());

    let mut pilot = AutoPilot::new();
    let mut result = GameLoopResult::Continue;
    for _ in 0..steps {
        let command = pilot.choose(game.state()).unwrap_or(Command::LeaveDungeon);
        let leaving = command == Command::LeaveDungeon;
        result = game.tick(command);
        print_messages(game.state());
        clock.advance(Duration::minutes(10));
        if leaving || result != GameLoopResult::Continue {
            break;
        }
    }

    match result {
        GameLoopResult::PlayerDied(msg) => {
            println!("You die: {}.", msg);
            // The floor memory survives; the explorer wakes on the surface.
            game.leave_dungeon();
        }
        GameLoopResult::PlayerQuit => {
            println!("Quitting without saving.");
            return Ok(());
        }
        GameLoopResult::Continue | GameLoopResult::SaveAndQuit => {
            if game.state().in_dungeon() {
                game.snapshot();
            }
        }
    }

    if let Some(summary) = game.state().floor_summary() {
        print!("{}", summary);
    }
    save_game(game.state(), save_path)
        .with_context(|| format!("saving to {}", save_path.display()))?;
    println!("Saved to {}", save_path.display());
    Ok(())
}

fn print_messages(state: &GameState) {
    for msg in &state.messages {
        println!("{}", msg);
    }
}
