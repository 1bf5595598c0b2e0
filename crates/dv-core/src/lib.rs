//! dv-core: Floor engine for the Delve dungeon crawler
//!
//! Deterministic floor generation, the persistent floor memory that is
//! merged back onto regenerated floors, time-based respawn, special-floor
//! gating and room-by-room exploration. Combat, dialogue and rendering are
//! left to collaborators behind the `Encounters` trait.

pub mod action;
pub mod dungeon;
pub mod special;
pub mod world;

mod consts;
mod gameloop;
mod rng;

pub use consts::*;
pub use gameloop::{Explorer, GameLoop, GameLoopResult, GameState};
pub use rng::GameRng;
