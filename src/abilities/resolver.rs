//! Effect resolution - applying effects to the board.

use tracing::debug;

use crate::core::GameState;
use crate::events::{EventBus, GameEvent};

use super::effect::{Effect, EffectBatch};

/// Result of resolving an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Effect applied.
    Success,
    /// Target was missing or already captured.
    Skipped,
}

/// Applies effects to game state and emits the matching events.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve a batch of effects in order.
    pub fn resolve_batch(state: &mut GameState, bus: &mut EventBus, batch: &EffectBatch) -> Vec<ResolveResult> {
        batch
            .iter()
            .map(|effect| Self::resolve_single(state, bus, effect))
            .collect()
    }

    /// Resolve one effect.
    ///
    /// Effects on a captured or unknown piece are skipped: abilities
    /// routinely target pieces that died earlier in the same batch.
    pub fn resolve_single(state: &mut GameState, bus: &mut EventBus, effect: &Effect) -> ResolveResult {
        let target = effect.target();
        let Some(piece) = state.board.piece_mut(target).filter(|piece| piece.is_active()) else {
            return ResolveResult::Skipped;
        };

        match *effect {
            Effect::Damage { amount, pierce, .. } => {
                let mitigated = if pierce { amount } else { amount - piece.fortify };
                let applied = piece.take_damage(mitigated);
                let remaining_hp = piece.current_hp;
                let coord = piece.coord();
                let dead = !piece.is_alive();

                if applied > 0 {
                    bus.publish(GameEvent::PieceDamaged {
                        entity: target,
                        amount: applied,
                        remaining_hp,
                    });
                }
                if dead && state.board.capture_soft(target) {
                    debug!(entity = %target, "killed by ability damage");
                    bus.publish(GameEvent::PieceCaptured { entity: target, coord });
                }
            }

            Effect::Heal { amount, .. } => {
                let healed = piece.heal(amount);
                if healed > 0 {
                    bus.publish(GameEvent::PieceHealed {
                        entity: target,
                        amount: healed,
                        remaining_hp: piece.current_hp,
                    });
                }
            }

            Effect::GainFortify { amount, cap, .. } => {
                piece.fortify = (piece.fortify + amount).min(cap).max(piece.fortify);
            }

            Effect::SetFortify { amount, .. } => {
                piece.fortify = amount.max(0);
            }

            Effect::AddAttack { amount, .. } => {
                piece.attack += amount;
            }

            Effect::ApplyBleed { stacks, .. } => {
                piece.bleed += stacks.max(0);
            }
        }

        ResolveResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Coord, EncounterConfig, EntityId, Team};
    use crate::pieces::{DefinitionId, MovementRule, Piece, PieceDefinition};
    use smallvec::smallvec;

    fn setup() -> (GameState, EntityId) {
        let mut state = GameState::new(&EncounterConfig::default(), 1);
        let def = PieceDefinition::new(DefinitionId::new(1), "Pawn", 4, 1).with_movement(MovementRule::pawn());
        let id = state
            .board
            .place(Piece::from_definition(&def, Team::Enemy).unwrap(), Coord::new(2, 2), Team::Enemy)
            .unwrap();
        (state, id)
    }

    #[test]
    fn test_damage_respects_fortify() {
        let (mut state, id) = setup();
        let mut bus = EventBus::recording();
        state.board.piece_mut(id).unwrap().fortify = 1;

        EffectResolver::resolve_single(&mut state, &mut bus, &Effect::Damage { target: id, amount: 2, pierce: false });
        assert_eq!(state.board.piece(id).unwrap().current_hp, 3);

        EffectResolver::resolve_single(&mut state, &mut bus, &Effect::Damage { target: id, amount: 2, pierce: true });
        assert_eq!(state.board.piece(id).unwrap().current_hp, 1);
        assert_eq!(bus.recorded().len(), 2);
    }

    #[test]
    fn test_lethal_damage_captures() {
        let (mut state, id) = setup();
        let mut bus = EventBus::recording();

        let batch: EffectBatch = smallvec![
            Effect::Damage { target: id, amount: 10, pierce: true },
            Effect::Heal { target: id, amount: 5 },
        ];
        let results = EffectResolver::resolve_batch(&mut state, &mut bus, &batch);

        assert_eq!(results, vec![ResolveResult::Success, ResolveResult::Skipped]);
        assert!(!state.board.piece(id).unwrap().is_active());
        assert!(state.board.get_at(Coord::new(2, 2)).is_none());
        assert!(matches!(bus.recorded().last(), Some(GameEvent::PieceCaptured { .. })));
    }

    #[test]
    fn test_stat_effects() {
        let (mut state, id) = setup();
        let mut bus = EventBus::new();

        for _ in 0..3 {
            EffectResolver::resolve_single(&mut state, &mut bus, &Effect::GainFortify { target: id, amount: 1, cap: 2 });
        }
        EffectResolver::resolve_single(&mut state, &mut bus, &Effect::AddAttack { target: id, amount: 2 });
        EffectResolver::resolve_single(&mut state, &mut bus, &Effect::ApplyBleed { target: id, stacks: 2 });

        let piece = state.board.piece(id).unwrap();
        assert_eq!(piece.fortify, 2);
        assert_eq!(piece.attack, 3);
        assert_eq!(piece.bleed, 2);
    }

    #[test]
    fn test_heal_without_gain_emits_nothing() {
        let (mut state, id) = setup();
        let mut bus = EventBus::recording();

        EffectResolver::resolve_single(&mut state, &mut bus, &Effect::Heal { target: id, amount: 3 });
        assert!(bus.recorded().is_empty());
    }
}
