//! World state
//!
//! Persistent floor memory, restoration, clearance, gating, options and
//! time.

pub mod clearance;
pub mod floor_state;
pub mod gate;
pub mod options;
pub mod restore;
pub mod time;

pub use clearance::ClearanceEvaluator;
pub use floor_state::{FloorState, FloorStateStore, RoomState};
pub use gate::AccessibilityGate;
pub use options::{DungeonOptions, OptionsError};
pub use restore::{FloorRestorer, RestoredFloor};
pub use time::{Clock, SimClock, SystemClock};
