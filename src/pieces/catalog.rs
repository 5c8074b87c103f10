//! Piece catalog for definition lookup.
//!
//! The `PieceCatalog` stores every definition an encounter may spawn.
//! It is read-only from the engine's point of view: spawning copies a
//! definition into a runtime piece and the catalog is never touched again.

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::ConfigError;

use super::definition::{DefinitionId, PieceDefinition};

/// Registry of piece definitions.
///
/// ## Example
///
/// ```
/// use rust_tactics::pieces::{DefinitionId, MovementRule, PieceCatalog, PieceDefinition};
///
/// let mut catalog = PieceCatalog::new();
/// catalog.register(
///     PieceDefinition::new(DefinitionId::new(1), "Pawn", 2, 1)
///         .with_movement(MovementRule::pawn()),
/// ).unwrap();
///
/// assert_eq!(catalog.get(DefinitionId::new(1)).unwrap().name, "Pawn");
/// ```
#[derive(Clone, Debug, Default)]
pub struct PieceCatalog {
    definitions: FxHashMap<DefinitionId, PieceDefinition>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "piece")]
    pieces: Vec<PieceDefinition>,
}

impl PieceCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// Fails if a definition with the same ID already exists.
    pub fn register(&mut self, definition: PieceDefinition) -> Result<(), ConfigError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(ConfigError::DuplicateDefinition(definition.id));
        }
        self.definitions.insert(definition.id, definition);
        Ok(())
    }

    /// Parse a catalog from TOML `[[piece]]` tables and validate it.
    ///
    /// ```
    /// use rust_tactics::pieces::{DefinitionId, PieceCatalog};
    ///
    /// let catalog = PieceCatalog::from_toml_str(r#"
    ///     [[piece]]
    ///     id = 1
    ///     name = "Rook"
    ///     max_hp = 5
    ///     attack = 2
    ///     movement = { kind = "slider", directions = "orthogonal", stride = 8 }
    /// "#).unwrap();
    ///
    /// assert!(catalog.contains(DefinitionId::new(1)));
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(source)?;
        let mut catalog = Self::new();
        for definition in file.pieces {
            catalog.register(definition)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Get a definition by ID.
    #[must_use]
    pub fn get(&self, id: DefinitionId) -> Option<&PieceDefinition> {
        self.definitions.get(&id)
    }

    /// Get a definition by ID, or a configuration error.
    pub fn require(&self, id: DefinitionId) -> Result<&PieceDefinition, ConfigError> {
        self.get(id).ok_or(ConfigError::UnknownDefinition(id))
    }

    /// Check if a definition exists.
    #[must_use]
    pub fn contains(&self, id: DefinitionId) -> bool {
        self.definitions.contains_key(&id)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over all definitions.
    pub fn iter(&self) -> impl Iterator<Item = &PieceDefinition> {
        self.definitions.values()
    }

    /// Check every definition is spawnable.
    ///
    /// Reports the lowest offending ID so the error is deterministic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids: Vec<_> = self.definitions.keys().copied().collect();
        ids.sort();

        for id in ids {
            let definition = &self.definitions[&id];
            if definition.movement.is_none() {
                return Err(ConfigError::MissingMovement(id));
            }
            if definition.patrol.as_ref().is_some_and(Vec::is_empty) {
                return Err(ConfigError::EmptyPatrol(id));
            }
        }
        Ok(())
    }
}
