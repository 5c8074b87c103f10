//! # rust-tactics
//!
//! Rules engine for a turn-based grid tactics game.
//!
//! ## Design Principles
//!
//! 1. **Exact Reversibility**: Every player command records the pieces it
//!    touched, the faction state, the RNG position and the AP it spent.
//!    Undo restores all of it, byte for byte.
//!
//! 2. **Deterministic**: Enemy order, enemy decisions and the one random
//!    movement rule all derive from the board and a seeded RNG.
//!
//! 3. **Closed Ability Set**: Modifiers are enums dispatched at fixed hook
//!    points, in a fixed order, through one resolver.
//!
//! ## Architecture
//!
//! - **Single Occupancy Map**: The board owns both piece storage and the
//!   coordinate index; nothing else moves pieces.
//!
//! - **Persistent Data Structures**: O(1) board snapshots via `im`, used
//!   for command records and intent previews.
//!
//! - **Synchronous Events**: State changes are published on an
//!   [`EventBus`] as they happen; presentation subscribes per topic.
//!
//! ## Modules
//!
//! - `core`: coordinates, entity ids, teams, RNG, configuration, state
//! - `board`: occupancy and piece storage
//! - `pieces`: definitions, catalog, runtime pieces, movement rules
//! - `combat`: attack context and resolution pipeline
//! - `abilities`: piece and faction modifiers, effects, hook dispatch
//! - `commands`: reversible commands and undo/redo history
//! - `turns`: phase machine, AP, encounter loop, enemy AI, intents, waves
//! - `events`: event types and the bus
//! - `error`: error taxonomy

pub mod abilities;
pub mod board;
pub mod combat;
pub mod commands;
pub mod core;
pub mod error;
pub mod events;
pub mod pieces;
pub mod turns;

// Re-export commonly used types
pub use crate::core::{Coord, Direction, EncounterConfig, EntityId, GameRng, GameRngState, GameState, Team, TeamMap};

pub use crate::board::Board;

pub use crate::pieces::{DefinitionId, DirectionSet, MovementRule, Piece, PieceCatalog, PieceDefinition};

pub use crate::combat::{AttackContext, CombatReport, CombatResolver, StrikeKind};

pub use crate::abilities::{Effect, EffectResolver, FactionModifier, FactionRuntime, HintColor, HintTile, Modifier};

pub use crate::commands::{Command, CommandAction, CommandHistory, CommandRecord};

pub use crate::turns::{
    ActionPoints, Encounter, EnemyStep, EnemyTurnDriver, Intent, IntentKind, Outcome, SpawnRequest, TurnPhase,
    TurnState, Wave, WaveDirector, WaveTrigger,
};

pub use crate::events::{EventBus, GameEvent, MoveReason, Topic};

pub use crate::error::{ActionRejected, ConfigError, InvariantViolation, Result, TacticsError};
