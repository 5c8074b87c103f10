//! Effect definitions.
//!
//! Effects are the atomic state changes abilities ask for. A hook never
//! mutates the board directly: it returns effects, and the
//! [`EffectResolver`](super::EffectResolver) applies them once the hook
//! has returned. That keeps hooks free of aliasing concerns and gives
//! every ability-driven change a single place where events are emitted.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::EntityId;

/// An atomic piece-state change.
///
/// ## Damage
///
/// - `Damage`: subtract hit points, reduced by fortification unless
///   `pierce` is set. Kills soft-capture the target.
///
/// ## Recovery
///
/// - `Heal`: restore hit points, capped at the maximum
///
/// ## Stats
///
/// - `GainFortify` / `SetFortify`: change flat damage reduction
/// - `AddAttack`: permanently raise attack
/// - `ApplyBleed`: add bleed stacks that tick at the start of the
///   owner's turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Damage {
        target: EntityId,
        amount: i32,
        pierce: bool,
    },
    Heal {
        target: EntityId,
        amount: i32,
    },
    GainFortify {
        target: EntityId,
        amount: i32,
        cap: i32,
    },
    SetFortify {
        target: EntityId,
        amount: i32,
    },
    AddAttack {
        target: EntityId,
        amount: i32,
    },
    ApplyBleed {
        target: EntityId,
        stacks: i32,
    },
}

impl Effect {
    /// The piece this effect applies to.
    #[must_use]
    pub fn target(&self) -> EntityId {
        match *self {
            Effect::Damage { target, .. }
            | Effect::Heal { target, .. }
            | Effect::GainFortify { target, .. }
            | Effect::SetFortify { target, .. }
            | Effect::AddAttack { target, .. }
            | Effect::ApplyBleed { target, .. } => target,
        }
    }
}

/// Effects produced by one hook invocation. Rarely more than a few.
pub type EffectBatch = SmallVec<[Effect; 4]>;
