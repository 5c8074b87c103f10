//! Piece definitions, runtime pieces and movement rules.
//!
//! ## Key Types
//!
//! - [`PieceDefinition`]: static catalog data for a piece type
//! - [`PieceCatalog`]: lookup of definitions by [`DefinitionId`]
//! - [`Piece`]: a definition placed on the board with its own mutable state
//! - [`MovementRule`]: stepper, slider and jumper movement families

pub mod catalog;
pub mod definition;
pub mod instance;
pub mod movement;

pub use catalog::PieceCatalog;
pub use definition::{DefinitionId, PieceDefinition};
pub use instance::{Lifecycle, ModifierList, PatrolRoute, Piece};
pub use movement::{DirectionSet, MovementRule};
