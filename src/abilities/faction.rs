//! Faction-scoped abilities.
//!
//! Some abilities belong to a whole side rather than one piece: "attacks
//! hit harder on a turn the leader has moved". Each team has one
//! `FactionRuntime` holding its faction modifiers and the bits of state
//! they track. The runtime is part of [`GameState`](crate::core::GameState),
//! so undo restores it along with the board.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::combat::{AttackContext, CombatRole};
use crate::core::Team;
use crate::pieces::Piece;

use super::effect::{Effect, EffectBatch};

/// A side-wide ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactionModifier {
    /// Attacks deal bonus damage on a turn the leader has moved.
    Rally { bonus: i32 },
    /// At turn start, heal every active piece of the faction.
    Regroup { heal: i32 },
    /// A faction attacker that kills its defender heals `heal`.
    Bloodlust { heal: i32 },
}

/// Per-team ability state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionRuntime {
    pub team: Team,
    pub modifiers: Vec<FactionModifier>,
    /// Set when the leader completes a move; cleared at turn end.
    pub leader_moved: bool,
}

impl FactionRuntime {
    #[must_use]
    pub fn new(team: Team) -> Self {
        Self {
            team,
            modifiers: Vec::new(),
            leader_moved: false,
        }
    }

    /// Add a faction modifier (builder pattern).
    #[must_use]
    pub fn with_modifier(mut self, modifier: FactionModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn on_turn_begin(&mut self, board: &Board) -> EffectBatch {
        let mut effects = EffectBatch::new();
        for modifier in &self.modifiers {
            if let FactionModifier::Regroup { heal } = *modifier {
                effects.extend(board.active(self.team).map(|ally| Effect::Heal {
                    target: ally.id,
                    amount: heal,
                }));
            }
        }
        effects
    }

    pub fn on_turn_end(&mut self) {
        self.leader_moved = false;
    }

    pub fn on_post_move(&mut self, mover: &Piece) {
        if mover.team == self.team && mover.leader {
            self.leader_moved = true;
        }
    }

    pub fn on_pre_attack(&self, attack: &mut AttackContext, role: CombatRole) {
        if role != CombatRole::Attacker || !self.leader_moved {
            return;
        }
        for modifier in &self.modifiers {
            if let FactionModifier::Rally { bonus } = *modifier {
                attack.damage_delta += bonus;
            }
        }
    }

    /// Follow-ups once an exchange has been resolved.
    pub fn on_post_attack(&mut self, attack: &AttackContext, role: CombatRole) -> EffectBatch {
        let mut effects = EffectBatch::new();
        for modifier in &self.modifiers {
            match *modifier {
                FactionModifier::Bloodlust { heal }
                    if role == CombatRole::Attacker && attack.defender_died && !attack.attacker_died =>
                {
                    effects.push(Effect::Heal {
                        target: attack.attacker,
                        amount: heal,
                    });
                }
                FactionModifier::Bloodlust { .. } | FactionModifier::Rally { .. } | FactionModifier::Regroup { .. } => {}
            }
        }
        effects
    }
}
