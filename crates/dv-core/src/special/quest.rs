//! Quest progress
//!
//! Narrative outcomes the floor engine needs to know about: how each boss
//! was resolved and which seals the explorer holds. The dialogue and
//! combat that produce these outcomes live outside the engine.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::dungeon::{Boss, SealType};

/// How a boss's story ended, if it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum BossResolution {
    /// Boss not yet met
    #[default]
    Unengaged,
    /// Fight or conversation started but not concluded
    Engaged,
    Defeated,
    Saved,
    Allied,
    Awakened,
    Consumed,
}

impl BossResolution {
    /// Whether the boss's floor counts as cleared
    pub fn is_resolved(self) -> bool {
        matches!(
            self,
            BossResolution::Defeated
                | BossResolution::Saved
                | BossResolution::Allied
                | BossResolution::Awakened
                | BossResolution::Consumed
        )
    }
}

/// Quest status tracking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestState {
    /// Latest known resolution per boss; absent means unengaged
    #[serde(default)]
    boss_resolutions: HashMap<Boss, BossResolution>,
    /// Seals the explorer has obtained
    #[serde(default)]
    seals: HashSet<SealType>,
}

impl QuestState {
    /// Create a new quest state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boss_resolution(&self, boss: Boss) -> BossResolution {
        self.boss_resolutions.get(&boss).copied().unwrap_or_default()
    }

    /// Record a boss outcome. A resolved boss never reverts to unresolved.
    pub fn set_boss_resolution(&mut self, boss: Boss, resolution: BossResolution) {
        if self.boss_resolution(boss).is_resolved() && !resolution.is_resolved() {
            return;
        }
        self.boss_resolutions.insert(boss, resolution);
    }

    pub fn has_seal(&self, seal: SealType) -> bool {
        self.seals.contains(&seal)
    }

    /// Record a seal as obtained. Returns false if it was already held.
    pub fn record_seal(&mut self, seal: SealType) -> bool {
        self.seals.insert(seal)
    }

    pub fn seal_count(&self) -> usize {
        self.seals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_boss_is_unengaged() {
        let quest = QuestState::new();
        assert_eq!(quest.boss_resolution(Boss::Sleeper), BossResolution::Unengaged);
        assert!(!BossResolution::Unengaged.is_resolved());
        assert!(!BossResolution::Engaged.is_resolved());
    }

    #[test]
    fn test_resolution_is_sticky() {
        let mut quest = QuestState::new();
        quest.set_boss_resolution(Boss::Warden, BossResolution::Saved);
        quest.set_boss_resolution(Boss::Warden, BossResolution::Engaged);
        assert_eq!(quest.boss_resolution(Boss::Warden), BossResolution::Saved);
        quest.set_boss_resolution(Boss::Warden, BossResolution::Allied);
        assert_eq!(quest.boss_resolution(Boss::Warden), BossResolution::Allied);
    }

    #[test]
    fn test_seals() {
        let mut quest = QuestState::new();
        assert!(quest.record_seal(SealType::Tide));
        assert!(!quest.record_seal(SealType::Tide));
        assert!(quest.has_seal(SealType::Tide));
        assert_eq!(quest.seal_count(), 1);
    }

    #[test]
    fn test_serializes_with_enum_keys() {
        let mut quest = QuestState::new();
        quest.set_boss_resolution(Boss::HollowKing, BossResolution::Consumed);
        quest.record_seal(SealType::Gale);
        let json = serde_json::to_string(&quest).unwrap();
        let back: QuestState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quest);
    }
}
