//! Tile highlights for intent previews.

use serde::{Deserialize, Serialize};

use crate::core::Coord;

/// What a highlighted tile means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HintColor {
    /// Destination of a move.
    Move,
    /// Primary attack target.
    Attack,
    /// Secondary tile hit by splash damage.
    Splash,
    /// Tile behind the target hit by a lance.
    Pierce,
}

/// A tile to highlight, and why.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HintTile {
    pub coord: Coord,
    pub color: HintColor,
}

impl HintTile {
    #[must_use]
    pub const fn new(coord: Coord, color: HintColor) -> Self {
        Self { coord, color }
    }
}
