//! Hook dispatch.
//!
//! `HookDispatcher` walks the relevant modifiers for a lifecycle point
//! and resolves whatever effects they return. A piece's modifier list is
//! detached while its hooks run, so hooks can read the whole board
//! (their owner included) and still update their own state.
//!
//! Order within a dispatch: the faction runtime first, then pieces in
//! ascending entity id, each piece's modifiers in list order.

use crate::board::Board;
use crate::combat::{AttackContext, CombatRole};
use crate::core::{Coord, EntityId, GameState, Team};
use crate::events::EventBus;
use crate::pieces::ModifierList;

use super::effect::EffectBatch;
use super::modifier::{HookContext, Modifier};
use super::resolver::EffectResolver;

/// Runs instance and faction hooks against game state.
pub struct HookDispatcher;

impl HookDispatcher {
    /// Run `f` over a piece's modifiers with the piece as hook owner.
    ///
    /// Returns `None` if the piece is unknown.
    pub fn with_modifiers<R>(
        board: &mut Board,
        id: EntityId,
        f: impl FnOnce(&mut ModifierList, &HookContext<'_>) -> R,
    ) -> Option<R> {
        let mut modifiers = std::mem::take(&mut board.piece_mut(id)?.modifiers);
        let view: &Board = board;
        let result = view.piece(id).map(|owner| {
            let ctx = HookContext { owner, board: view };
            f(&mut modifiers, &ctx)
        });
        if let Some(piece) = board.piece_mut(id) {
            piece.modifiers = modifiers;
        }
        result
    }

    /// Fire spawn hooks for a freshly placed piece.
    pub fn spawn(state: &mut GameState, bus: &mut EventBus, id: EntityId) {
        let effects = Self::with_modifiers(&mut state.board, id, |modifiers, ctx| {
            collect(modifiers, |m| m.on_spawn(ctx))
        })
        .unwrap_or_default();
        EffectResolver::resolve_batch(state, bus, &effects);
    }

    /// Append a modifier to a piece and fire its spawn hook.
    ///
    /// Returns `false` if the piece is unknown.
    pub fn equip(state: &mut GameState, bus: &mut EventBus, id: EntityId, modifier: Modifier) -> bool {
        let Some(piece) = state.board.piece_mut(id) else {
            return false;
        };
        piece.modifiers.push(modifier);
        let effects = Self::with_modifiers(&mut state.board, id, |modifiers, ctx| {
            modifiers.last_mut().map(|m| m.on_spawn(ctx)).unwrap_or_default()
        })
        .unwrap_or_default();
        EffectResolver::resolve_batch(state, bus, &effects);
        true
    }

    /// Fire turn-begin hooks for one side.
    pub fn turn_begin(state: &mut GameState, bus: &mut EventBus, team: Team) {
        let effects = state.factions[team].on_turn_begin(&state.board);
        EffectResolver::resolve_batch(state, bus, &effects);

        for id in active_ids(&state.board, team) {
            if !state.board.piece(id).is_some_and(|p| p.is_active()) {
                continue;
            }
            let effects = Self::with_modifiers(&mut state.board, id, |modifiers, ctx| {
                collect(modifiers, |m| m.on_turn_begin(ctx))
            })
            .unwrap_or_default();
            EffectResolver::resolve_batch(state, bus, &effects);
        }
    }

    /// Fire turn-end hooks for one side.
    pub fn turn_end(state: &mut GameState, bus: &mut EventBus, team: Team) {
        state.factions[team].on_turn_end();

        for id in active_ids(&state.board, team) {
            if !state.board.piece(id).is_some_and(|p| p.is_active()) {
                continue;
            }
            let effects = Self::with_modifiers(&mut state.board, id, |modifiers, ctx| {
                collect(modifiers, |m| m.on_turn_end(ctx))
            })
            .unwrap_or_default();
            EffectResolver::resolve_batch(state, bus, &effects);
        }
    }

    /// Fire post-move hooks after a piece changed tiles.
    pub fn post_move(state: &mut GameState, bus: &mut EventBus, id: EntityId, from: Coord, to: Coord) {
        if let Some(mover) = state.board.piece(id) {
            let team = mover.team;
            let mover = mover.clone();
            state.factions[team].on_post_move(&mover);
        }
        let effects = Self::with_modifiers(&mut state.board, id, |modifiers, ctx| {
            collect(modifiers, |m| m.on_post_move(ctx, from, to))
        })
        .unwrap_or_default();
        EffectResolver::resolve_batch(state, bus, &effects);
    }

    /// Let one combatant's modifiers adjust an attack.
    pub fn pre_attack(board: &mut Board, id: EntityId, attack: &mut AttackContext, role: CombatRole) {
        Self::with_modifiers(board, id, |modifiers, ctx| {
            for modifier in modifiers.iter_mut() {
                modifier.on_pre_attack(ctx, attack, role);
            }
        });
    }

    /// Collect one combatant's follow-up effects.
    pub fn post_attack(board: &mut Board, id: EntityId, attack: &AttackContext, role: CombatRole) -> EffectBatch {
        Self::with_modifiers(board, id, |modifiers, ctx| {
            collect(modifiers, |m| m.on_post_attack(ctx, attack, role))
        })
        .unwrap_or_default()
    }
}

fn collect(
    modifiers: &mut ModifierList,
    mut hook: impl FnMut(&mut Modifier) -> EffectBatch,
) -> EffectBatch {
    let mut effects = EffectBatch::new();
    for modifier in modifiers.iter_mut() {
        effects.extend(hook(modifier));
    }
    effects
}

fn active_ids(board: &Board, team: Team) -> Vec<EntityId> {
    board.active(team).map(|p| p.id).collect()
}
