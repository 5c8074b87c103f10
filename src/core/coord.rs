//! Grid coordinates and directions.
//!
//! The board is addressed by integer `(x, y)` pairs. `x` is the column,
//! `y` is the row. Row 0 is the player's home row; the enemy side enters
//! from the far edge and advances toward decreasing `y`.
//!
//! Coordinates are signed so that walking off the board produces a
//! representable value that `Board::in_bounds` can reject.

use serde::{Deserialize, Serialize};

/// A tile coordinate.
///
/// Ordering is column-major (`x` first, then `y`), which gives legal-move
/// sets a stable iteration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a raw delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Walk `steps` tiles in a direction.
    #[must_use]
    pub const fn step(self, direction: Direction, steps: i32) -> Self {
        self.offset(direction.dx * steps, direction.dy * steps)
    }

    /// Manhattan distance.
    #[must_use]
    pub const fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance.
    #[must_use]
    pub fn chebyshev(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit step on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const NORTH: Direction = Direction::new(0, 1);
    pub const SOUTH: Direction = Direction::new(0, -1);
    pub const EAST: Direction = Direction::new(1, 0);
    pub const WEST: Direction = Direction::new(-1, 0);
    pub const NORTH_EAST: Direction = Direction::new(1, 1);
    pub const NORTH_WEST: Direction = Direction::new(-1, 1);
    pub const SOUTH_EAST: Direction = Direction::new(1, -1);
    pub const SOUTH_WEST: Direction = Direction::new(-1, -1);

    /// The four orthogonal directions.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::NORTH,
        Direction::EAST,
        Direction::SOUTH,
        Direction::WEST,
    ];

    /// The four diagonal directions.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NORTH_EAST,
        Direction::SOUTH_EAST,
        Direction::SOUTH_WEST,
        Direction::NORTH_WEST,
    ];

    /// All eight directions, orthogonal first.
    pub const ALL: [Direction; 8] = [
        Direction::NORTH,
        Direction::EAST,
        Direction::SOUTH,
        Direction::WEST,
        Direction::NORTH_EAST,
        Direction::SOUTH_EAST,
        Direction::SOUTH_WEST,
        Direction::NORTH_WEST,
    ];

    /// The eight L-shaped jump offsets.
    pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
        (1, 2),
        (2, 1),
        (2, -1),
        (1, -2),
        (-1, -2),
        (-2, -1),
        (-2, 1),
        (-1, 2),
    ];

    /// Create a direction from raw components.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Unit direction pointing from `from` toward `to`.
    ///
    /// Components are clamped to -1..=1, so any two distinct tiles yield a
    /// direction even when they are not on a shared line. Returns `None`
    /// when the tiles are equal.
    #[must_use]
    pub fn toward(from: Coord, to: Coord) -> Option<Self> {
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        if dx == 0 && dy == 0 {
            None
        } else {
            Some(Self::new(dx, dy))
        }
    }
}
