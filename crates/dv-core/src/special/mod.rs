//! Special game systems
//!
//! Quest progress and the collaborator hooks rooms call out to.

pub mod encounter;
pub mod quest;

pub use encounter::{CombatOutcome, Encounters, MonsterGroup};
pub use quest::{BossResolution, QuestState};
