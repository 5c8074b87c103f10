//! Game events.
//!
//! Events are notifications emitted after a state change has been
//! applied. They never drive rules: presentation, audio and logging
//! collaborators subscribe to them, and the engine's behavior is the
//! same whether anyone listens or not.

use serde::{Deserialize, Serialize};

use crate::combat::CombatReport;
use crate::commands::CommandAction;
use crate::core::{Coord, EntityId, Team};
use crate::pieces::DefinitionId;
use crate::turns::{Outcome, TurnPhase};

/// Why a piece changed tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveReason {
    /// A move command.
    Normal,
    /// Reversal of a move command.
    Undo,
    /// Re-execution of an undone move.
    Redo,
    /// Scripted movement such as a patrol step.
    Forced,
}

/// Routing key for subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Spawns, moves, captures and restores.
    Board,
    /// Damage, healing and attack summaries.
    Combat,
    /// AP, phase, lives and outcome.
    Turn,
    /// Command execution and history.
    Command,
}

impl Topic {
    /// Every topic.
    pub const ALL: [Topic; 4] = [Topic::Board, Topic::Combat, Topic::Turn, Topic::Command];
}

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Board ===
    PieceSpawned {
        entity: EntityId,
        definition: DefinitionId,
        team: Team,
        coord: Coord,
    },
    PieceMoved {
        entity: EntityId,
        from: Coord,
        to: Coord,
        reason: MoveReason,
    },
    PieceCaptured {
        entity: EntityId,
        coord: Coord,
    },
    PieceRestored {
        entity: EntityId,
        coord: Coord,
    },

    // === Combat ===
    PieceDamaged {
        entity: EntityId,
        amount: i32,
        remaining_hp: i32,
    },
    PieceHealed {
        entity: EntityId,
        amount: i32,
        remaining_hp: i32,
    },
    AttackResolved(CombatReport),

    // === Turn ===
    ApChanged {
        before: u32,
        after: u32,
    },
    PhaseChanged {
        from: TurnPhase,
        to: TurnPhase,
    },
    LifeLost {
        entity: EntityId,
        remaining: u32,
    },
    OutcomeReached(Outcome),

    // === Command ===
    CommandExecuted {
        action: CommandAction,
        issuer: Team,
    },
    CommandUndone {
        action: CommandAction,
    },
    CommandRedone {
        action: CommandAction,
    },
    HistoryCleared,
}

impl GameEvent {
    /// The topic this event is routed on.
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::PieceSpawned { .. }
            | GameEvent::PieceMoved { .. }
            | GameEvent::PieceCaptured { .. }
            | GameEvent::PieceRestored { .. } => Topic::Board,
            GameEvent::PieceDamaged { .. } | GameEvent::PieceHealed { .. } | GameEvent::AttackResolved(_) => {
                Topic::Combat
            }
            GameEvent::ApChanged { .. }
            | GameEvent::PhaseChanged { .. }
            | GameEvent::LifeLost { .. }
            | GameEvent::OutcomeReached(_) => Topic::Turn,
            GameEvent::CommandExecuted { .. }
            | GameEvent::CommandUndone { .. }
            | GameEvent::CommandRedone { .. }
            | GameEvent::HistoryCleared => Topic::Command,
        }
    }
}
