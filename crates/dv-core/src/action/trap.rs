//! Trap mechanics
//!
//! A room's trap springs once, on the first visit. Agility may dodge it;
//! otherwise the effect is handed to the collaborator that owns the
//! explorer's hit points, pack and status.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::consts::MAX_EVASION_PERCENT;
use crate::dungeon::{Room, RoomId};
use crate::gameloop::GameState;
use crate::rng::GameRng;
use crate::special::encounter::Encounters;

/// Lasting condition a trap can inflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum StatusEffect {
    #[strum(serialize = "poisoned")]
    Poisoned,
    #[strum(serialize = "slowed")]
    Slowed,
    #[strum(serialize = "confused")]
    Confused,
}

impl StatusEffect {
    pub const ALL: [StatusEffect; 3] = [
        StatusEffect::Poisoned,
        StatusEffect::Slowed,
        StatusEffect::Confused,
    ];
}

/// What a sprung trap does to the explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapEffect {
    /// Hit point damage
    Damage(u32),
    /// Something falls out of the pack
    LootLoss,
    Status(StatusEffect),
}

impl TrapEffect {
    pub fn message(&self) -> String {
        match self {
            TrapEffect::Damage(n) => format!("A hidden blade slashes you for {} damage!", n),
            TrapEffect::LootLoss => "A trapdoor swallows something from your pack!".to_string(),
            TrapEffect::Status(status) => format!("A cloud of spores leaves you {}.", status),
        }
    }
}

/// How a trap resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    Evaded,
    Sprung(TrapEffect),
}

/// Chance to dodge a trap for a given agility
pub fn evasion_percent(agility: u32) -> u32 {
    agility.saturating_mul(3).min(MAX_EVASION_PERCENT)
}

/// Roll the effect of a trap in `room`
pub fn roll_effect(room: &Room, rng: &mut GameRng) -> TrapEffect {
    match rng.rn2(4) {
        0 | 1 => TrapEffect::Damage(rng.dice(1 + room.danger_rating as u32, 4)),
        2 => TrapEffect::LootLoss,
        _ => {
            let status = rng
                .choose(&StatusEffect::ALL)
                .copied()
                .unwrap_or(StatusEffect::Poisoned);
            TrapEffect::Status(status)
        }
    }
}

/// Spring the trap in room `id` if it has not yet gone off.
///
/// Returns None when there is no armed trap.
pub fn resolve_trap(
    state: &mut GameState,
    encounters: &mut dyn Encounters,
    id: &RoomId,
) -> Option<TrapOutcome> {
    let room = state.floor.as_ref()?.room(id)?.clone();
    if !room.has_trap || room.trap_triggered {
        return None;
    }

    let evaded = state.options.trap_evasion
        && state.rng.percent(evasion_percent(state.explorer.agility));

    let outcome = if evaded {
        state.message("You spot a tripwire and step over it.");
        TrapOutcome::Evaded
    } else {
        let effect = roll_effect(&room, &mut state.rng);
        state.message(effect.message());
        encounters.apply_trap(&room, &effect);
        TrapOutcome::Sprung(effect)
    };

    if let Some(room) = state.floor.as_mut().and_then(|f| f.room_mut(id)) {
        room.trap_triggered = true;
    }
    debug!(room = %id, ?outcome, "trap resolved");
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::RoomType;

    #[test]
    fn test_evasion_is_capped() {
        assert_eq!(evasion_percent(0), 0);
        assert_eq!(evasion_percent(10), 30);
        assert_eq!(evasion_percent(20), 60);
        assert_eq!(evasion_percent(99), 60);
    }

    #[test]
    fn test_damage_scales_with_danger() {
        let mut room = Room::new(RoomId::new(1, 1), "Trap", RoomType::Chamber);
        room.danger_rating = 3;
        let mut rng = GameRng::new(11);
        for _ in 0..200 {
            if let TrapEffect::Damage(n) = roll_effect(&room, &mut rng) {
                assert!((4..=16).contains(&n));
            }
        }
    }

    #[test]
    fn test_effect_messages() {
        assert!(TrapEffect::Damage(5).message().contains("5 damage"));
        assert!(TrapEffect::Status(StatusEffect::Slowed).message().contains("slowed"));
    }
}
