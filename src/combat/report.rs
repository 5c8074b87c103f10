//! Attack summaries.

use serde::{Deserialize, Serialize};

use crate::core::EntityId;

use super::context::AttackContext;

/// What an attack did, as published on the event bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub damage_to_defender: i32,
    pub damage_to_attacker: i32,
    pub attacker_died: bool,
    pub defender_died: bool,
}

impl From<&AttackContext> for CombatReport {
    fn from(ctx: &AttackContext) -> Self {
        Self {
            attacker: ctx.attacker,
            defender: ctx.defender,
            damage_to_defender: ctx.damage_to_defender,
            damage_to_attacker: ctx.damage_to_attacker,
            attacker_died: ctx.attacker_died,
            defender_died: ctx.defender_died,
        }
    }
}
