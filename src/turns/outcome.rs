//! Encounter results.

use serde::{Deserialize, Serialize};

/// How an encounter ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every wave was triggered and no enemy remains.
    Victory,
    /// The player ran out of lives.
    Defeat,
}

impl Outcome {
    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Outcome::Victory)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Victory => write!(f, "Victory"),
            Outcome::Defeat => write!(f, "Defeat"),
        }
    }
}
