//! Attack resolution.
//!
//! ## Pipeline
//!
//! 1. Build an [`AttackContext`] from both combatants.
//! 2. Pre-attack hooks: attacker's modifiers, defender's modifiers, then
//!    the attacker's faction and the defender's faction.
//! 3. Damage to the defender: effective damage minus the defender's
//!    fortification (unless mitigation is bypassed), floored at zero.
//! 4. Damage to the attacker: zero for one-way strikes, otherwise the
//!    defender's attack minus the attacker's fortification.
//! 5. Apply damage. Pieces at zero hit points or below are soft-captured.
//! 6. Post-attack hooks, in the same order as step 2; their effects are
//!    resolved in order, faction effects after the instance ones.
//! 7. Publish the [`CombatReport`].
//!
//! ```
//! use rust_tactics::combat::{CombatResolver, StrikeKind};
//! use rust_tactics::core::{Coord, EncounterConfig, GameState, Team};
//! use rust_tactics::events::EventBus;
//! use rust_tactics::pieces::{DefinitionId, MovementRule, Piece, PieceDefinition};
//!
//! let mut state = GameState::new(&EncounterConfig::default(), 0);
//! let def = PieceDefinition::new(DefinitionId::new(1), "Rook", 5, 3).with_movement(MovementRule::rook());
//! let a = state.board.place(Piece::from_definition(&def, Team::Player).unwrap(), Coord::new(0, 0), Team::Player).unwrap();
//! let d = state.board.place(Piece::from_definition(&def, Team::Enemy).unwrap(), Coord::new(0, 4), Team::Enemy).unwrap();
//! state.board.piece_mut(d).unwrap().fortify = 1;
//!
//! let report = CombatResolver::resolve(&mut state, &mut EventBus::new(), a, d, StrikeKind::OneWay).unwrap();
//! assert_eq!(report.damage_to_defender, 2);
//! assert_eq!(report.damage_to_attacker, 0);
//! ```

use tracing::debug;

use crate::abilities::{EffectBatch, EffectResolver, HookDispatcher};
use crate::core::{EntityId, GameState};
use crate::error::CombatError;
use crate::events::{EventBus, GameEvent};
use crate::pieces::Piece;

use super::context::{AttackContext, CombatRole, StrikeKind};
use super::report::CombatReport;

/// Resolves attacks between pieces.
pub struct CombatResolver;

impl CombatResolver {
    /// Resolve one attack.
    ///
    /// Both pieces must be active and distinct. Range and legality are
    /// the caller's concern.
    pub fn resolve(
        state: &mut GameState,
        bus: &mut EventBus,
        attacker: EntityId,
        defender: EntityId,
        strike: StrikeKind,
    ) -> Result<CombatReport, CombatError> {
        if attacker == defender {
            return Err(CombatError::SelfTarget);
        }
        let a = active(state, attacker)?;
        let d = active(state, defender)?;
        let mut ctx = AttackContext::new(a, d, strike);

        // === Pre-attack ===
        HookDispatcher::pre_attack(&mut state.board, attacker, &mut ctx, CombatRole::Attacker);
        HookDispatcher::pre_attack(&mut state.board, defender, &mut ctx, CombatRole::Defender);
        state.factions[ctx.attacker_team].on_pre_attack(&mut ctx, CombatRole::Attacker);
        state.factions[ctx.defender_team].on_pre_attack(&mut ctx, CombatRole::Defender);

        // === Damage ===
        let a = active(state, attacker)?;
        let d = active(state, defender)?;
        let mitigation = if ctx.bypass_mitigation { 0 } else { d.fortify };
        ctx.damage_to_defender = (ctx.effective_damage() - mitigation).max(0);
        ctx.damage_to_attacker = match strike {
            StrikeKind::OneWay => 0,
            StrikeKind::Simultaneous => (d.attack - a.fortify).max(0),
        };

        ctx.defender_died = apply_damage(state, bus, defender, ctx.damage_to_defender);
        ctx.attacker_died = apply_damage(state, bus, attacker, ctx.damage_to_attacker);

        debug!(
            %attacker,
            %defender,
            to_defender = ctx.damage_to_defender,
            to_attacker = ctx.damage_to_attacker,
            defender_died = ctx.defender_died,
            attacker_died = ctx.attacker_died,
            "attack resolved"
        );

        // === Post-attack ===
        let mut effects = EffectBatch::new();
        effects.extend(HookDispatcher::post_attack(&mut state.board, attacker, &ctx, CombatRole::Attacker));
        effects.extend(HookDispatcher::post_attack(&mut state.board, defender, &ctx, CombatRole::Defender));
        effects.extend(state.factions[ctx.attacker_team].on_post_attack(&ctx, CombatRole::Attacker));
        effects.extend(state.factions[ctx.defender_team].on_post_attack(&ctx, CombatRole::Defender));
        EffectResolver::resolve_batch(state, bus, &effects);

        let report = CombatReport::from(&ctx);
        bus.publish(GameEvent::AttackResolved(report));
        Ok(report)
    }
}

fn active(state: &GameState, id: EntityId) -> Result<&Piece, CombatError> {
    state
        .board
        .piece(id)
        .filter(|piece| piece.is_active())
        .ok_or(CombatError::InactiveCombatant(id))
}

/// Subtract hit points and capture on death. Returns whether it died.
fn apply_damage(state: &mut GameState, bus: &mut EventBus, id: EntityId, amount: i32) -> bool {
    let Some(piece) = state.board.piece_mut(id) else {
        return false;
    };
    let applied = piece.take_damage(amount);
    let remaining_hp = piece.current_hp;
    let coord = piece.coord();

    if applied > 0 {
        bus.publish(GameEvent::PieceDamaged {
            entity: id,
            amount: applied,
            remaining_hp,
        });
    }
    if remaining_hp > 0 {
        return false;
    }
    if state.board.capture_soft(id) {
        bus.publish(GameEvent::PieceCaptured { entity: id, coord });
    }
    true
}
