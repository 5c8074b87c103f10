//! Movement rules.
//!
//! A `MovementRule` answers one question: which tiles may this piece
//! legally move to or attack from where it stands? There are three
//! families, all parameterized so that catalog data can describe the
//! usual chess archetypes and variants of them.
//!
//! ## Stepper
//!
//! Moves straight forward up to `forward` tiles (plus a one-time bonus on
//! its first move), stopping before any occupied tile. Captures one tile
//! diagonally forward when enabled.
//!
//! ## Slider
//!
//! Moves along rays up to `stride` tiles. A ray stops at the board edge
//! and at the first blocking tile; an opposing piece's tile is included
//! as a capture target.
//!
//! ## Jumper
//!
//! Moves to any of the eight L-shaped offsets not held by an ally. When
//! `forward_only` is set, exactly one of the forward-progressing
//! destinations is chosen with the encounter RNG; if none exist, every
//! remaining destination is offered.
//!
//! ```
//! use rust_tactics::board::Board;
//! use rust_tactics::core::{Coord, GameRng, Team};
//! use rust_tactics::pieces::{DefinitionId, MovementRule, Piece, PieceDefinition};
//!
//! let mut board = Board::new(8, 8, 1.0);
//! let def = PieceDefinition::new(DefinitionId::new(1), "Rook", 5, 2)
//!     .with_movement(MovementRule::rook());
//! let id = board.place(Piece::from_definition(&def, Team::Player).unwrap(), Coord::new(0, 0), Team::Player).unwrap();
//!
//! let piece = board.piece(id).unwrap();
//! let moves = piece.movement.legal_moves(piece, &board, &mut GameRng::new(0));
//! assert_eq!(moves.len(), 14);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::Board;
use crate::core::{Coord, Direction, GameRng, Team};

use super::instance::Piece;

/// Ray sets available to sliders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSet {
    Orthogonal,
    Diagonal,
    Omni,
    /// Straight forward and both forward diagonals.
    ForwardArc,
}

impl DirectionSet {
    /// Concrete directions for a piece of the given team.
    #[must_use]
    pub fn directions(self, team: Team) -> SmallVec<[Direction; 8]> {
        match self {
            DirectionSet::Orthogonal => Direction::ORTHOGONAL.iter().copied().collect(),
            DirectionSet::Diagonal => Direction::DIAGONAL.iter().copied().collect(),
            DirectionSet::Omni => Direction::ALL.iter().copied().collect(),
            DirectionSet::ForwardArc => {
                let f = team.forward();
                [Direction::new(0, f), Direction::new(-1, f), Direction::new(1, f)]
                    .into_iter()
                    .collect()
            }
        }
    }
}

fn default_true() -> bool {
    true
}

/// How a piece moves. Data-driven: catalogs pick a variant and its
/// parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementRule {
    Stepper {
        forward: u8,
        #[serde(default)]
        first_move_bonus: u8,
        #[serde(default = "default_true")]
        diagonal_capture: bool,
    },
    Slider {
        directions: DirectionSet,
        stride: u8,
        #[serde(default)]
        pass_through_allies: bool,
    },
    Jumper {
        #[serde(default)]
        forward_only: bool,
    },
}

impl MovementRule {
    /// One step forward, two on the first move, diagonal captures.
    #[must_use]
    pub const fn pawn() -> Self {
        MovementRule::Stepper {
            forward: 1,
            first_move_bonus: 1,
            diagonal_capture: true,
        }
    }

    #[must_use]
    pub const fn rook() -> Self {
        MovementRule::Slider {
            directions: DirectionSet::Orthogonal,
            stride: u8::MAX,
            pass_through_allies: false,
        }
    }

    #[must_use]
    pub const fn bishop() -> Self {
        MovementRule::Slider {
            directions: DirectionSet::Diagonal,
            stride: u8::MAX,
            pass_through_allies: false,
        }
    }

    #[must_use]
    pub const fn queen() -> Self {
        MovementRule::Slider {
            directions: DirectionSet::Omni,
            stride: u8::MAX,
            pass_through_allies: false,
        }
    }

    #[must_use]
    pub const fn king() -> Self {
        MovementRule::Slider {
            directions: DirectionSet::Omni,
            stride: 1,
            pass_through_allies: false,
        }
    }

    #[must_use]
    pub const fn knight() -> Self {
        MovementRule::Jumper { forward_only: false }
    }

    /// A knight that always presses forward, picking one destination at random.
    #[must_use]
    pub const fn forward_knight() -> Self {
        MovementRule::Jumper { forward_only: true }
    }

    /// Does evaluating this rule draw from the RNG?
    #[must_use]
    pub fn is_random(&self) -> bool {
        matches!(self, MovementRule::Jumper { forward_only: true })
    }

    /// Tiles the piece may move to or attack.
    ///
    /// Pure with respect to the board. Only a forward-only jumper with
    /// at least one forward destination advances `rng`.
    pub fn legal_moves(&self, piece: &Piece, board: &Board, rng: &mut GameRng) -> BTreeSet<Coord> {
        match *self {
            MovementRule::Stepper {
                forward,
                first_move_bonus,
                diagonal_capture,
            } => stepper_moves(piece, board, forward, first_move_bonus, diagonal_capture),
            MovementRule::Slider {
                directions,
                stride,
                pass_through_allies,
            } => slider_moves(piece, board, directions, stride, pass_through_allies),
            MovementRule::Jumper { forward_only } => jumper_moves(piece, board, forward_only, rng),
        }
    }
}

fn stepper_moves(
    piece: &Piece,
    board: &Board,
    forward: u8,
    first_move_bonus: u8,
    diagonal_capture: bool,
) -> BTreeSet<Coord> {
    let origin = piece.coord();
    let f = piece.team.forward();
    let mut moves = BTreeSet::new();

    let mut reach = i32::from(forward);
    if piece.first_move_available {
        reach += i32::from(first_move_bonus);
    }

    for step in 1..=reach {
        let to = origin.offset(0, f * step);
        if !board.in_bounds(to) || board.get_at(to).is_some() {
            break;
        }
        moves.insert(to);
    }

    if diagonal_capture {
        for dx in [-1, 1] {
            let to = origin.offset(dx, f);
            if board.get_at(to).is_some_and(|other| other.team != piece.team) {
                moves.insert(to);
            }
        }
    }

    moves
}

fn slider_moves(
    piece: &Piece,
    board: &Board,
    directions: DirectionSet,
    stride: u8,
    pass_through_allies: bool,
) -> BTreeSet<Coord> {
    let origin = piece.coord();
    let mut moves = BTreeSet::new();

    for direction in directions.directions(piece.team) {
        for step in 1..=i32::from(stride) {
            let to = origin.step(direction, step);
            if !board.in_bounds(to) {
                break;
            }
            match board.get_at(to) {
                None => {
                    moves.insert(to);
                }
                Some(other) if other.team == piece.team => {
                    if pass_through_allies {
                        continue;
                    }
                    break;
                }
                Some(_) => {
                    moves.insert(to);
                    break;
                }
            }
        }
    }

    moves
}

fn jumper_moves(piece: &Piece, board: &Board, forward_only: bool, rng: &mut GameRng) -> BTreeSet<Coord> {
    let origin = piece.coord();
    let f = piece.team.forward();
    let mut advancing = Vec::new();
    let mut other = Vec::new();

    for (dx, dy) in Direction::KNIGHT_OFFSETS {
        let to = origin.offset(dx, dy);
        if !board.in_bounds(to) {
            continue;
        }
        if board.get_at(to).is_some_and(|occupant| occupant.team == piece.team) {
            continue;
        }
        if dy * f > 0 {
            advancing.push(to);
        } else {
            other.push(to);
        }
    }

    if !forward_only {
        return advancing.into_iter().chain(other).collect();
    }

    // Candidates are in offset order, so the pick depends only on the seed.
    match rng.choose(&advancing) {
        Some(&pick) => BTreeSet::from([pick]),
        None => other.into_iter().collect(),
    }
}
