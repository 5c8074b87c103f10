//! Piece definitions - static catalog data.
//!
//! `PieceDefinition` holds the immutable profile of a piece type: its
//! stats, movement rule and granted abilities. An external catalog
//! authors these; the engine only ever copies them into runtime
//! [`Piece`](super::Piece) instances and never writes back.

use serde::{Deserialize, Serialize};

use crate::abilities::Modifier;
use crate::core::Coord;

use super::movement::MovementRule;

/// Unique identifier for a piece definition.
///
/// This identifies the "type" of piece (e.g. "Rook"), not a specific
/// piece on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefinitionId(pub u32);

impl DefinitionId {
    /// Create a new definition ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Definition({})", self.0)
    }
}

/// Static piece definition.
///
/// `movement` is optional at the data level so that catalogs authored
/// without one load successfully and fail validation with a precise
/// [`ConfigError::MissingMovement`](crate::error::ConfigError::MissingMovement)
/// instead of a generic parse error.
///
/// ## Example
///
/// ```
/// use rust_tactics::pieces::{DefinitionId, MovementRule, PieceDefinition};
/// use rust_tactics::abilities::Modifier;
///
/// let rook = PieceDefinition::new(DefinitionId::new(1), "Rook", 5, 2)
///     .with_movement(MovementRule::rook())
///     .with_modifier(Modifier::Piercing);
///
/// assert_eq!(rook.max_hp, 5);
/// assert_eq!(rook.modifiers.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceDefinition {
    /// Unique identifier for this definition.
    pub id: DefinitionId,

    /// Display name.
    pub name: String,

    /// Maximum (and starting) hit points.
    pub max_hp: i32,

    /// Base attack value.
    pub attack: i32,

    /// Movement rule. Required for spawning.
    #[serde(default)]
    pub movement: Option<MovementRule>,

    /// Abilities granted at creation, in dispatch order.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    /// Cyclic patrol route. Pieces with a route use the boss routine.
    #[serde(default)]
    pub patrol: Option<Vec<Coord>>,

    /// Marks the faction's leader piece.
    #[serde(default)]
    pub leader: bool,
}

impl PieceDefinition {
    /// Create a new definition with no movement or abilities.
    #[must_use]
    pub fn new(id: DefinitionId, name: impl Into<String>, max_hp: i32, attack: i32) -> Self {
        Self {
            id,
            name: name.into(),
            max_hp,
            attack,
            movement: None,
            modifiers: Vec::new(),
            patrol: None,
            leader: false,
        }
    }

    /// Set the movement rule (builder pattern).
    #[must_use]
    pub fn with_movement(mut self, movement: MovementRule) -> Self {
        self.movement = Some(movement);
        self
    }

    /// Grant an ability (builder pattern).
    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Give the piece a patrol route (builder pattern).
    #[must_use]
    pub fn with_patrol(mut self, route: Vec<Coord>) -> Self {
        self.patrol = Some(route);
        self
    }

    /// Mark as the faction leader (builder pattern).
    #[must_use]
    pub fn as_leader(mut self) -> Self {
        self.leader = true;
        self
    }

    /// Does this definition use the boss routine?
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.patrol.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_id() {
        let id = DefinitionId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Definition(42)");
    }

    #[test]
    fn test_definition_builder() {
        let def = PieceDefinition::new(DefinitionId::new(1), "Warden", 12, 3)
            .with_movement(MovementRule::king())
            .with_patrol(vec![Coord::new(0, 7), Coord::new(1, 7)])
            .as_leader();

        assert_eq!(def.name, "Warden");
        assert!(def.is_boss());
        assert!(def.leader);
        assert_eq!(def.movement, Some(MovementRule::king()));
    }

    #[test]
    fn test_definition_serialization() {
        let def = PieceDefinition::new(DefinitionId::new(2), "Knight", 4, 2)
            .with_movement(MovementRule::knight())
            .with_modifier(Modifier::Lifesteal { amount: 1 });

        let json = serde_json::to_string(&def).unwrap();
        let deserialized: PieceDefinition = serde_json::from_str(&json).unwrap();

        assert_eq!(def, deserialized);
    }
}
