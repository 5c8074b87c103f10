//! Reified player and enemy actions.
//!
//! A `Command` wraps a [`CommandAction`] with the team issuing it. On
//! execution it validates every precondition before touching anything,
//! then snapshots the state, mutates, and stores a [`CommandRecord`]
//! describing exactly which pieces changed and how.
//!
//! ## Undo
//!
//! Undo first checks that every piece the command touched still has the
//! value recorded right after execution. If anything drifted the command
//! refuses with [`InvariantViolation`] rather than guess. Otherwise it
//! rewinds the pieces, faction runtimes, RNG and AP to their recorded
//! pre-execution values.
//!
//! ```
//! use rust_tactics::commands::{Command, CommandAction, CommandContext, CommandCosts};
//! use rust_tactics::core::{Coord, EncounterConfig, GameState, Team};
//! use rust_tactics::events::{EventBus, MoveReason};
//! use rust_tactics::pieces::{DefinitionId, MovementRule, Piece, PieceDefinition};
//! use rust_tactics::turns::{ActionPoints, TurnPhase};
//!
//! let mut state = GameState::new(&EncounterConfig::default(), 0);
//! let def = PieceDefinition::new(DefinitionId::new(1), "Rook", 5, 2).with_movement(MovementRule::rook());
//! let rook = state.board.place(Piece::from_definition(&def, Team::Player).unwrap(), Coord::new(0, 0), Team::Player).unwrap();
//! let before = state.board.encode().unwrap();
//!
//! let mut bus = EventBus::new();
//! let mut ap = ActionPoints::new(3);
//! let mut ctx = CommandContext {
//!     state: &mut state,
//!     bus: &mut bus,
//!     ap: Some(&mut ap),
//!     phase: TurnPhase::PlayerTurn,
//!     costs: CommandCosts::default(),
//!     reason: MoveReason::Normal,
//! };
//!
//! let mut command = Command::new(CommandAction::Move { piece: rook, to: Coord::new(0, 5) }, Team::Player);
//! command.execute(&mut ctx).unwrap();
//! command.undo(&mut ctx).unwrap();
//!
//! assert_eq!(ap.current(), 3);
//! assert_eq!(state.board.encode().unwrap(), before);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::abilities::{FactionRuntime, HookDispatcher};
use crate::board::Board;
use crate::combat::{CombatReport, CombatResolver, StrikeKind};
use crate::core::{Coord, EncounterConfig, EntityId, GameRngState, GameState, Team, TeamMap};
use crate::error::{ActionRejected, InvariantViolation};
use crate::events::{EventBus, GameEvent, MoveReason};
use crate::pieces::Piece;
use crate::turns::{ActionPoints, TurnPhase};

/// What a command does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandAction {
    /// Move a piece to an empty legal tile.
    Move { piece: EntityId, to: Coord },
    /// Attack the opposing piece on a legal tile. The attacker stays put.
    Attack { attacker: EntityId, target: Coord },
}

impl CommandAction {
    /// The piece performing the action.
    #[must_use]
    pub const fn actor(self) -> EntityId {
        match self {
            CommandAction::Move { piece, .. } => piece,
            CommandAction::Attack { attacker, .. } => attacker,
        }
    }

    /// The tile the action aims at.
    #[must_use]
    pub const fn target(self) -> Coord {
        match self {
            CommandAction::Move { to, .. } => to,
            CommandAction::Attack { target, .. } => target,
        }
    }
}

/// AP price list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCosts {
    pub move_cost: u32,
    pub attack_cost: u32,
}

impl Default for CommandCosts {
    fn default() -> Self {
        Self {
            move_cost: 1,
            attack_cost: 1,
        }
    }
}

impl From<&EncounterConfig> for CommandCosts {
    fn from(config: &EncounterConfig) -> Self {
        Self {
            move_cost: config.move_cost,
            attack_cost: config.attack_cost,
        }
    }
}

impl CommandCosts {
    #[must_use]
    pub const fn cost_of(self, action: CommandAction) -> u32 {
        match action {
            CommandAction::Move { .. } => self.move_cost,
            CommandAction::Attack { .. } => self.attack_cost,
        }
    }
}

/// Everything a command needs to run.
pub struct CommandContext<'a> {
    pub state: &'a mut GameState,
    pub bus: &'a mut EventBus,
    /// `None` for enemy commands, which cost nothing.
    pub ap: Option<&'a mut ActionPoints>,
    pub phase: TurnPhase,
    pub costs: CommandCosts,
    /// Reason stamped on move events.
    pub reason: MoveReason,
}

/// What an executed command changed.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandRecord {
    /// Touched pieces as they were before execution.
    pub before: Vec<Piece>,
    /// The same pieces right after execution, in the same order.
    pub after: Vec<Piece>,
    pub ap_spent: u32,
    pub factions_before: TeamMap<FactionRuntime>,
    pub rng_before: GameRngState,
    /// Present for attacks.
    pub report: Option<CombatReport>,
}

/// A reified action.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    action: CommandAction,
    issuer: Team,
    record: Option<CommandRecord>,
}

impl Command {
    #[must_use]
    pub const fn new(action: CommandAction, issuer: Team) -> Self {
        Self {
            action,
            issuer,
            record: None,
        }
    }

    #[must_use]
    pub fn action(&self) -> CommandAction {
        self.action
    }

    #[must_use]
    pub fn issuer(&self) -> Team {
        self.issuer
    }

    /// The record of the last execution, if the command is applied.
    #[must_use]
    pub fn record(&self) -> Option<&CommandRecord> {
        self.record.as_ref()
    }

    /// Fail if the occupancy index holds a stale entry on the actor's
    /// tile or on the target tile.
    pub fn check_occupancy(&self, board: &Board) -> Result<(), InvariantViolation> {
        let origin = board.piece(self.action.actor()).map(Piece::coord);
        for coord in origin.into_iter().chain([self.action.target()]) {
            if let Some(entity) = board.stale_entry(coord) {
                warn!(%coord, %entity, action = ?self.action, "stale occupancy entry under command");
                return Err(InvariantViolation::StaleOccupancy { coord, entity });
            }
        }
        Ok(())
    }

    /// Check every precondition. Returns the AP cost.
    ///
    /// May advance the RNG (forward-only jumpers); `execute` rewinds it
    /// on rejection.
    fn validate(&self, ctx: &mut CommandContext<'_>) -> Result<u32, ActionRejected> {
        let expected = match self.issuer {
            Team::Player => TurnPhase::PlayerTurn,
            Team::Enemy => TurnPhase::EnemyTurn,
        };
        if ctx.phase != expected {
            return Err(ActionRejected::WrongPhase(ctx.phase));
        }

        let actor = self.action.actor();
        let board = &ctx.state.board;
        let piece = board.piece(actor).ok_or(ActionRejected::UnknownPiece(actor))?;
        if !piece.is_active() {
            return Err(ActionRejected::PieceInactive(actor));
        }
        if piece.team != self.issuer {
            return Err(ActionRejected::NotOwned(actor));
        }

        let cost = ctx.costs.cost_of(self.action);
        if let Some(ap) = ctx.ap.as_deref() {
            if !ap.can_afford(cost) {
                return Err(ActionRejected::InsufficientAp {
                    needed: cost,
                    available: ap.current(),
                });
            }
        }

        let target = self.action.target();
        let illegal = ActionRejected::IllegalTarget { entity: actor, to: target };
        match (self.action, board.get_at(target)) {
            (_, Some(occupant)) if occupant.team == piece.team => {
                return Err(ActionRejected::AllyBlocked(target));
            }
            (CommandAction::Move { .. }, Some(_)) | (CommandAction::Attack { .. }, None) => return Err(illegal),
            _ => {}
        }

        let legal = piece.movement.legal_moves(piece, board, &mut ctx.state.rng);
        if !legal.contains(&target) {
            return Err(illegal);
        }
        Ok(cost)
    }

    /// Validate and apply.
    ///
    /// On rejection nothing changes and no event is published.
    pub fn execute(&mut self, ctx: &mut CommandContext<'_>) -> Result<&CommandRecord, ActionRejected> {
        let rng_before = ctx.state.rng.state();
        let cost = match self.validate(ctx) {
            Ok(cost) => cost,
            Err(reason) => {
                ctx.state.rng.restore(&rng_before);
                debug!(action = ?self.action, issuer = %self.issuer, %reason, "command rejected");
                return Err(reason);
            }
        };

        let board_before = ctx.state.board.clone();
        let factions_before = ctx.state.factions.clone();
        let mut report = None;

        match self.action {
            CommandAction::Move { piece, to } => {
                let from = board_before.piece(piece).map_or(to, Piece::coord);
                ctx.state.board.move_piece(piece, to);
                if let Some(p) = ctx.state.board.piece_mut(piece) {
                    p.mark_moved();
                }
                ctx.bus.publish(GameEvent::PieceMoved {
                    entity: piece,
                    from,
                    to,
                    reason: ctx.reason,
                });
                HookDispatcher::post_move(ctx.state, ctx.bus, piece, from, to);
            }
            CommandAction::Attack { attacker, target } => {
                let defender = board_before
                    .get_at(target)
                    .map(|p| p.id)
                    .ok_or(ActionRejected::IllegalTarget { entity: attacker, to: target })?;
                let strike = StrikeKind::for_side(self.issuer.is_player());
                let resolved = CombatResolver::resolve(ctx.state, ctx.bus, attacker, defender, strike)
                    .map_err(|_| ActionRejected::IllegalTarget { entity: attacker, to: target })?;
                report = Some(resolved);
            }
        }

        let mut ap_spent = 0;
        if let Some(ap) = ctx.ap.as_deref_mut() {
            let before = ap.current();
            if ap.spend(cost) {
                ap_spent = cost;
            }
            ctx.bus.publish(GameEvent::ApChanged {
                before,
                after: ap.current(),
            });
        }

        let (before, after) = touched_pieces(&board_before, &ctx.state.board);
        debug!(action = ?self.action, issuer = %self.issuer, touched = before.len(), "command executed");
        ctx.bus.publish(GameEvent::CommandExecuted {
            action: self.action,
            issuer: self.issuer,
        });

        Ok(&*self.record.insert(CommandRecord {
            before,
            after,
            ap_spent,
            factions_before,
            rng_before,
            report,
        }))
    }

    /// Revert an executed command.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<(), InvariantViolation> {
        let actor = self.action.actor();
        let Some(record) = self.record.take() else {
            return Err(InvariantViolation::UndoTargetMismatch { entity: actor });
        };

        for expected in &record.after {
            if ctx.state.board.piece(expected.id) != Some(expected) {
                warn!(entity = %expected.id, action = ?self.action, "undo target drifted from its recorded state");
                let entity = expected.id;
                self.record = Some(record);
                return Err(InvariantViolation::UndoTargetMismatch { entity });
            }
        }

        ctx.state.board.rewind(&record.before);
        ctx.state.factions = record.factions_before.clone();
        ctx.state.rng.restore(&record.rng_before);

        if let Some(ap) = ctx.ap.as_deref_mut() {
            let before = ap.current();
            ap.refund(record.ap_spent);
            if ap.current() != before {
                ctx.bus.publish(GameEvent::ApChanged {
                    before,
                    after: ap.current(),
                });
            }
        }

        for (old, new) in record.before.iter().zip(&record.after) {
            match (new.is_active(), old.is_active()) {
                (false, true) => ctx.bus.publish(GameEvent::PieceRestored {
                    entity: old.id,
                    coord: old.coord(),
                }),
                (true, false) => ctx.bus.publish(GameEvent::PieceCaptured {
                    entity: old.id,
                    coord: new.coord(),
                }),
                (true, true) if new.coord() != old.coord() => ctx.bus.publish(GameEvent::PieceMoved {
                    entity: old.id,
                    from: new.coord(),
                    to: old.coord(),
                    reason: MoveReason::Undo,
                }),
                _ => {}
            }

            let (was, is) = (old.current_hp, new.current_hp);
            if was > is {
                ctx.bus.publish(GameEvent::PieceHealed {
                    entity: old.id,
                    amount: was - is,
                    remaining_hp: was,
                });
            } else if was < is {
                ctx.bus.publish(GameEvent::PieceDamaged {
                    entity: old.id,
                    amount: is - was,
                    remaining_hp: was,
                });
            }
        }

        debug!(action = ?self.action, "command undone");
        Ok(())
    }
}

/// Pieces whose value differs between two boards, as (before, after).
fn touched_pieces(before: &Board, after: &Board) -> (Vec<Piece>, Vec<Piece>) {
    after
        .pieces()
        .filter_map(|new| match before.piece(new.id) {
            Some(old) if old != new => Some((old.clone(), new.clone())),
            _ => None,
        })
        .unzip()
}
