//! Encounter configuration.
//!
//! An external setup collaborator supplies the board size, the action
//! point economy and the number of lives before an encounter starts.
//! The configuration is validated once; an invalid configuration is a
//! fatal setup error, never a mid-turn failure.
//!
//! ```
//! use rust_tactics::core::EncounterConfig;
//!
//! let config = EncounterConfig::from_toml_str(r#"
//!     columns = 6
//!     rows = 10
//!     ap_per_turn = 2
//! "#).unwrap();
//!
//! assert_eq!(config.columns, 6);
//! assert_eq!(config.lives, 3); // default
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Board and economy settings for one encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Number of columns.
    pub columns: i32,

    /// Number of rows. Row 0 is the player's home row.
    pub rows: i32,

    /// World-space size of one tile. Carried for presentation
    /// collaborators; the rules never read it.
    pub tile_size: f32,

    /// Action points granted at the start of each player turn.
    pub ap_per_turn: u32,

    /// Lives the player may lose to enemies reaching the home row.
    pub lives: u32,

    /// AP cost of a move command.
    pub move_cost: u32,

    /// AP cost of an attack command.
    pub attack_cost: u32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
            tile_size: 1.0,
            ap_per_turn: 3,
            lives: 3,
            move_cost: 1,
            attack_cost: 1,
        }
    }
}

impl EncounterConfig {
    /// Create a configuration with the given board size and defaults
    /// for everything else.
    #[must_use]
    pub fn new(columns: i32, rows: i32) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Set action points per turn (builder pattern).
    #[must_use]
    pub fn with_ap_per_turn(mut self, ap: u32) -> Self {
        self.ap_per_turn = ap;
        self
    }

    /// Set lives (builder pattern).
    #[must_use]
    pub fn with_lives(mut self, lives: u32) -> Self {
        self.lives = lives;
        self
    }

    /// Set command costs (builder pattern).
    #[must_use]
    pub fn with_costs(mut self, move_cost: u32, attack_cost: u32) -> Self {
        self.move_cost = move_cost;
        self.attack_cost = attack_cost;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a playable encounter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns <= 0 || self.rows <= 0 {
            return Err(ConfigError::InvalidDimensions {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.ap_per_turn == 0 {
            return Err(ConfigError::ZeroApPerTurn);
        }
        if self.lives == 0 {
            return Err(ConfigError::ZeroLives);
        }
        Ok(())
    }
}
