//! Error taxonomy.
//!
//! Three families of failure, each with a different recovery story:
//!
//! - [`ActionRejected`]: a gameplay request that fails its preconditions.
//!   Nothing changed, no event was emitted; the caller simply tries
//!   something else.
//! - [`InvariantViolation`]: internal state no longer matches what a
//!   command recorded. The command is aborted and the undo history is
//!   cleared so nothing is replayed against desynchronised state.
//! - [`ConfigError`]: missing or malformed setup data. Surfaced once when
//!   an encounter is built and fatal for that encounter.
//!
//! [`TacticsError`] wraps all of them for callers that want a single type.

use thiserror::Error;

use crate::core::{Coord, EntityId};
use crate::pieces::DefinitionId;
use crate::turns::TurnPhase;

/// A player request that failed validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("action not allowed during {0:?}")]
    WrongPhase(TurnPhase),

    #[error("encounter is over")]
    EncounterOver,

    #[error("unknown piece {0}")]
    UnknownPiece(EntityId),

    #[error("piece {0} has been captured")]
    PieceInactive(EntityId),

    #[error("piece {0} does not belong to the acting side")]
    NotOwned(EntityId),

    #[error("insufficient action points: need {needed}, have {available}")]
    InsufficientAp { needed: u32, available: u32 },

    #[error("{to} is not a legal target for {entity}")]
    IllegalTarget { entity: EntityId, to: Coord },

    #[error("{0} is occupied by an ally")]
    AllyBlocked(Coord),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

/// Internal state diverged from what a command recorded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("undo target {entity} no longer matches its recorded state")]
    UndoTargetMismatch { entity: EntityId },

    #[error("occupancy entry at {coord} points at {entity}, which is elsewhere")]
    StaleOccupancy { coord: Coord, entity: EntityId },

    #[error("redo no longer applies: {0}")]
    RedoRejected(ActionRejected),
}

/// Setup data is missing or malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {columns}x{rows}")]
    InvalidDimensions { columns: i32, rows: i32 },

    #[error("ap_per_turn must be at least 1")]
    ZeroApPerTurn,

    #[error("lives must be at least 1")]
    ZeroLives,

    #[error("definition {0} has no movement rule assigned")]
    MissingMovement(DefinitionId),

    #[error("definition {0} registered twice")]
    DuplicateDefinition(DefinitionId),

    #[error("unknown definition {0}")]
    UnknownDefinition(DefinitionId),

    #[error("definition {0} has an empty patrol route")]
    EmptyPatrol(DefinitionId),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Board placement failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0} is out of bounds")]
    OutOfBounds(Coord),

    #[error("{0} is already occupied")]
    Occupied(Coord),
}

/// Illegal phase transition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("cannot transition from {from:?} to {to:?}")]
    IllegalTransition { from: TurnPhase, to: TurnPhase },

    #[error("phase is frozen after the encounter ended")]
    Frozen,
}

/// Combat could not be resolved between the given pieces.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("combatant {0} is not an active piece")]
    InactiveCombatant(EntityId),

    #[error("a piece cannot attack itself")]
    SelfTarget,
}

/// Spawning a piece for an encounter failed.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Umbrella error for callers that do not care about the family.
#[derive(Debug, Error)]
pub enum TacticsError {
    #[error(transparent)]
    Rejected(#[from] ActionRejected),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

pub type Result<T> = std::result::Result<T, TacticsError>;
