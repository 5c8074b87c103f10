//! Enemy behaviour.
//!
//! Enemies act one at a time in a fixed order, frozen when the enemy
//! turn starts:
//!
//! 1. row distance to the player's home row, ascending,
//! 2. column ascending,
//! 3. entity id.
//!
//! ## Regular enemies
//!
//! Each regular enemy captures the closest opposing piece among its legal
//! captures (Manhattan distance, ties by row then column). Without a
//! capture it advances to the empty legal tile farthest from where it
//! stands (ties: most forward, then lowest column).
//!
//! ## Bosses
//!
//! A boss (a piece with a patrol route) fires a barrage along all eight
//! directions. Each ray stops at the first occupied tile; opposing pieces
//! there take a one-way strike, allies soak it harmlessly. The boss then
//! advances its patrol index and steps onto the next patrol tile if that
//! tile is free.
//!
//! ## Pacing
//!
//! [`EnemyTurnDriver::step`] processes one enemy per call so an external
//! driver can animate between actions; [`Encounter::run_enemy_turn`]
//! loops it to completion. A dropped driver is replaced with
//! [`Encounter::resume_enemy_turn`].

use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::abilities::HookDispatcher;
use crate::board::Board;
use crate::combat::{CombatResolver, StrikeKind};
use crate::commands::{Command, CommandAction, CommandContext, CommandCosts};
use crate::core::{Coord, Direction, EntityId, GameRng, GameState, Team};
use crate::error::{ActionRejected, TacticsError};
use crate::events::{EventBus, GameEvent, MoveReason};
use crate::pieces::{PatrolRoute, Piece};

use super::encounter::Encounter;
use super::phase::TurnPhase;

/// What an enemy did with its activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    /// Executed a move or attack command.
    Command(CommandAction),
    /// Boss barrage, followed by a patrol step.
    Barrage {
        /// Every tile the rays crossed, including the tiles they stopped on.
        tiles: Vec<Coord>,
        /// Opposing pieces struck.
        hits: Vec<EntityId>,
        /// Where the boss moved, if its next patrol tile was free.
        moved_to: Option<Coord>,
    },
    /// Nothing legal to do.
    Idle,
}

/// Enemy decision making.
pub struct EnemyAi;

impl EnemyAi {
    /// Processing order for the active pieces of `team`.
    #[must_use]
    pub fn turn_order(board: &Board, team: Team) -> Vec<EntityId> {
        let home = board.home_row(team.opponent());
        let mut order: Vec<_> = board
            .active(team)
            .map(|piece| {
                let at = piece.coord();
                ((at.y.abs_diff(home), at.x, piece.id), piece.id)
            })
            .collect();
        order.sort_unstable_by_key(|&(key, _)| key);
        order.into_iter().map(|(_, id)| id).collect()
    }

    /// Choose a command for a regular piece.
    ///
    /// Draws from a copy of `rng`, so the command's own validation sees
    /// the same random pick.
    #[must_use]
    pub fn plan(piece: &Piece, board: &Board, rng: &GameRng) -> Option<CommandAction> {
        let origin = piece.coord();
        let legal = piece.movement.legal_moves(piece, board, &mut rng.clone());
        trace!(entity = %piece.id, options = legal.len(), "planning enemy action");

        let capture = legal
            .iter()
            .copied()
            .filter(|&to| board.get_at(to).is_some_and(|other| other.team != piece.team))
            .min_by_key(|&to| (to.manhattan(origin), to.y, to.x));
        if let Some(target) = capture {
            return Some(CommandAction::Attack {
                attacker: piece.id,
                target,
            });
        }

        let forward = piece.team.forward();
        legal
            .iter()
            .copied()
            .filter(|&to| board.get_at(to).is_none())
            .max_by_key(|&to| (to.manhattan(origin), to.y * forward, Reverse(to.x)))
            .map(|to| CommandAction::Move { piece: piece.id, to })
    }

    /// Tiles a barrage from `boss` crosses and the opposing pieces it hits.
    #[must_use]
    pub fn barrage_rays(boss: &Piece, board: &Board) -> (Vec<Coord>, Vec<EntityId>) {
        let mut tiles = Vec::new();
        let mut hits = Vec::new();
        for direction in Direction::ALL {
            let mut at = boss.coord();
            loop {
                at = at.step(direction, 1);
                if !board.in_bounds(at) {
                    break;
                }
                tiles.push(at);
                if let Some(other) = board.get_at(at) {
                    if other.team != boss.team {
                        hits.push(other.id);
                    }
                    break;
                }
            }
        }
        (tiles, hits)
    }

    /// Let one piece take its activation.
    ///
    /// Regular commands go straight to the board: they cost nothing and
    /// never enter the undo history.
    pub fn act(state: &mut GameState, bus: &mut EventBus, id: EntityId) -> EnemyAction {
        let Some(piece) = state.board.piece(id).filter(|p| p.is_active()) else {
            return EnemyAction::Idle;
        };
        if piece.is_boss() {
            return Self::barrage(state, bus, id);
        }

        let team = piece.team;
        let Some(action) = Self::plan(piece, &state.board, &state.rng) else {
            debug!(entity = %id, "enemy has no legal action");
            return EnemyAction::Idle;
        };

        let mut command = Command::new(action, team);
        let mut ctx = CommandContext {
            state,
            bus,
            ap: None,
            phase: TurnPhase::EnemyTurn,
            costs: CommandCosts::default(),
            reason: MoveReason::Normal,
        };
        match command.execute(&mut ctx) {
            Ok(_) => {
                debug!(entity = %id, ?action, "enemy acted");
                EnemyAction::Command(action)
            }
            Err(reason) => {
                debug!(entity = %id, ?action, %reason, "enemy plan rejected");
                EnemyAction::Idle
            }
        }
    }

    fn barrage(state: &mut GameState, bus: &mut EventBus, id: EntityId) -> EnemyAction {
        let Some(boss) = state.board.piece(id) else {
            return EnemyAction::Idle;
        };
        let (tiles, hits) = Self::barrage_rays(boss, &state.board);
        debug!(boss = %id, hits = hits.len(), "boss barrage");

        for &target in &hits {
            if let Err(err) = CombatResolver::resolve(state, bus, id, target, StrikeKind::OneWay) {
                trace!(boss = %id, %target, %err, "barrage target skipped");
            }
        }

        let next = state
            .board
            .piece_mut(id)
            .and_then(|boss| boss.patrol.as_mut())
            .and_then(PatrolRoute::advance);
        let moved_to = next.filter(|&to| Self::patrol_step(state, bus, id, to));

        EnemyAction::Barrage { tiles, hits, moved_to }
    }

    fn patrol_step(state: &mut GameState, bus: &mut EventBus, id: EntityId, to: Coord) -> bool {
        let Some(from) = state.board.piece(id).filter(|p| p.is_active()).map(Piece::coord) else {
            return false;
        };
        if !state.board.in_bounds(to) || state.board.is_occupied(to) || !state.board.move_piece(id, to) {
            debug!(boss = %id, %to, "patrol step blocked");
            return false;
        }
        if let Some(boss) = state.board.piece_mut(id) {
            boss.mark_moved();
        }
        bus.publish(GameEvent::PieceMoved {
            entity: id,
            from,
            to,
            reason: MoveReason::Forced,
        });
        HookDispatcher::post_move(state, bus, id, from, to);
        true
    }
}

/// Result of one [`EnemyTurnDriver::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStep {
    /// The enemy at `index` of the frozen order took its activation.
    Acted { index: usize, total: usize, entity: EntityId },
    /// Every enemy has acted and the turn has been handed back (or the
    /// encounter ended).
    Finished,
}

/// Walks the frozen enemy order one activation at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemyTurnDriver {
    order: Vec<EntityId>,
    cursor: usize,
    enemy_turn: u32,
    finished: bool,
}

impl EnemyTurnDriver {
    pub(crate) fn new(order: Vec<EntityId>, enemy_turn: u32) -> Self {
        Self {
            order,
            cursor: 0,
            enemy_turn,
            finished: false,
        }
    }

    /// The frozen processing order.
    #[must_use]
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// Enemies in the order that have not been processed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }

    /// Process the next enemy, or finish the turn when none are left.
    ///
    /// Enemies captured before their activation, or already activated
    /// through another driver, are skipped. The defeat check runs after
    /// every activation.
    pub fn step(&mut self, encounter: &mut Encounter) -> Result<EnemyStep, TacticsError> {
        if self.finished || encounter.is_over() {
            self.finished = true;
            return Ok(EnemyStep::Finished);
        }
        let phase = encounter.phase();
        if phase != TurnPhase::EnemyTurn || encounter.enemy_turns_started() != self.enemy_turn {
            return Err(ActionRejected::WrongPhase(phase).into());
        }

        while self.cursor < self.order.len() {
            let index = self.cursor;
            let entity = self.order[index];
            self.cursor += 1;

            if encounter.has_enemy_acted(entity) || !encounter.board().piece(entity).is_some_and(Piece::is_active) {
                continue;
            }
            encounter.activate_enemy(entity);
            encounter.check_defeat();
            return Ok(EnemyStep::Acted {
                index,
                total: self.order.len(),
                entity,
            });
        }

        self.finished = true;
        encounter.finish_enemy_turn()?;
        Ok(EnemyStep::Finished)
    }
}
