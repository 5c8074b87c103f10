//! Board storage and occupancy.
//!
//! The `Board` owns every piece of an encounter plus a coordinate index of
//! the active ones. Both maps are persistent (`im::OrdMap`), so cloning
//! a board is O(1): command records and intent previews take snapshots
//! freely.
//!
//! ## Occupancy
//!
//! A tile holds at most one active piece. The occupancy index can in
//! principle drift from the pieces (a stale entry pointing at a piece
//! that was captured or moved elsewhere). Lookups never trust such an
//! entry, and mutations prune it before writing.

use im::OrdMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{Coord, EntityId, Team};
use crate::error::BoardError;
use crate::pieces::{Lifecycle, Piece};

/// The grid, its pieces and the occupancy index.
///
/// ## Usage
///
/// ```
/// use rust_tactics::board::Board;
/// use rust_tactics::core::{Coord, Team};
/// use rust_tactics::pieces::{DefinitionId, MovementRule, Piece, PieceDefinition};
///
/// let mut board = Board::new(8, 8, 1.0);
/// let def = PieceDefinition::new(DefinitionId::new(1), "Pawn", 2, 1)
///     .with_movement(MovementRule::pawn());
///
/// let id = board.place(Piece::from_definition(&def, Team::Player).unwrap(), Coord::new(3, 0), Team::Player).unwrap();
/// assert_eq!(board.get_at(Coord::new(3, 0)).map(|p| p.id), Some(id));
///
/// assert!(board.move_piece(id, Coord::new(3, 1)));
/// assert!(board.get_at(Coord::new(3, 0)).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    columns: i32,
    rows: i32,
    tile_size: f32,
    pieces: OrdMap<EntityId, Piece>,
    occupancy: OrdMap<Coord, EntityId>,
    next_id: u32,
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new(columns: i32, rows: i32, tile_size: f32) -> Self {
        Self {
            columns,
            rows,
            tile_size,
            pieces: OrdMap::new(),
            occupancy: OrdMap::new(),
            next_id: 1,
        }
    }

    // === Geometry ===

    #[must_use]
    pub fn columns(&self) -> i32 {
        self.columns
    }

    #[must_use]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    #[must_use]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        (0..self.columns).contains(&coord.x) && (0..self.rows).contains(&coord.y)
    }

    /// The row a team defends. Enemies reaching the player's home row
    /// cost a life.
    #[must_use]
    pub fn home_row(&self, team: Team) -> i32 {
        match team {
            Team::Player => 0,
            Team::Enemy => self.rows - 1,
        }
    }

    /// World-space center of a tile, for presentation collaborators.
    #[must_use]
    pub fn tile_center(&self, coord: Coord) -> (f32, f32) {
        (
            (coord.x as f32 + 0.5) * self.tile_size,
            (coord.y as f32 + 0.5) * self.tile_size,
        )
    }

    // === Queries ===

    /// The active piece on a tile, if any.
    ///
    /// Stale occupancy entries (pointing at a captured piece or one that
    /// now stands elsewhere) read as empty.
    #[must_use]
    pub fn get_at(&self, coord: Coord) -> Option<&Piece> {
        let id = self.occupancy.get(&coord)?;
        self.pieces
            .get(id)
            .filter(|piece| piece.is_active() && piece.coord() == coord)
    }

    /// The entity a stale occupancy entry at `coord` points at, if the
    /// entry exists and does not match an active piece standing there.
    #[must_use]
    pub fn stale_entry(&self, coord: Coord) -> Option<EntityId> {
        let &id = self.occupancy.get(&coord)?;
        let valid = self
            .pieces
            .get(&id)
            .is_some_and(|piece| piece.is_active() && piece.coord() == coord);
        (!valid).then_some(id)
    }

    #[must_use]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.get_at(coord).is_some()
    }

    /// Look up a piece by id, active or captured.
    #[must_use]
    pub fn piece(&self, id: EntityId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// Mutable access to a piece.
    ///
    /// Position and lifecycle have no public setters; use the board's
    /// movement, capture and restore operations for those.
    pub fn piece_mut(&mut self, id: EntityId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    /// Every piece the board knows about, in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// Active pieces of one team, in id order.
    pub fn active(&self, team: Team) -> impl Iterator<Item = &Piece> {
        self.pieces
            .values()
            .filter(move |piece| piece.team == team && piece.is_active())
    }

    /// Number of active pieces on a team.
    #[must_use]
    pub fn count_active(&self, team: Team) -> usize {
        self.active(team).count()
    }

    // === Mutation ===

    /// Put a new piece on the board and assign its id.
    pub fn place(&mut self, mut piece: Piece, coord: Coord, team: Team) -> Result<EntityId, BoardError> {
        if !self.in_bounds(coord) {
            return Err(BoardError::OutOfBounds(coord));
        }
        self.prune_at(coord);
        if self.occupancy.contains_key(&coord) {
            return Err(BoardError::Occupied(coord));
        }

        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        piece.id = id;
        piece.team = team;
        piece.set_lifecycle(Lifecycle::Active);
        piece.set_coord(coord);

        debug!(entity = %id, %coord, %team, name = %piece.name, "piece placed");
        self.occupancy.insert(coord, id);
        self.pieces.insert(id, piece);
        Ok(id)
    }

    /// Move an active piece to an empty in-bounds tile.
    ///
    /// Returns `false` without changing anything if the piece is unknown
    /// or captured, or if the destination is out of bounds or held by
    /// another piece. Moving a piece onto its own tile succeeds.
    pub fn move_piece(&mut self, id: EntityId, to: Coord) -> bool {
        if !self.in_bounds(to) {
            return false;
        }
        let from = match self.pieces.get(&id) {
            Some(piece) if piece.is_active() => piece.coord(),
            _ => return false,
        };
        if from == to {
            return true;
        }

        self.prune_at(to);
        if self.occupancy.contains_key(&to) {
            return false;
        }

        if self.occupancy.get(&from) == Some(&id) {
            self.occupancy.remove(&from);
        }
        self.occupancy.insert(to, id);
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.set_coord(to);
        }
        true
    }

    /// Take an active piece off the board while keeping its state.
    pub fn capture_soft(&mut self, id: EntityId) -> bool {
        let coord = match self.pieces.get(&id) {
            Some(piece) if piece.is_active() => piece.coord(),
            _ => return false,
        };

        if self.occupancy.get(&coord) == Some(&id) {
            self.occupancy.remove(&coord);
        }
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.set_lifecycle(Lifecycle::Captured);
        }
        debug!(entity = %id, %coord, "piece captured");
        true
    }

    /// Put a captured piece back on an empty tile.
    pub fn restore(&mut self, id: EntityId, coord: Coord) -> bool {
        if !self.in_bounds(coord) {
            return false;
        }
        match self.pieces.get(&id) {
            Some(piece) if !piece.is_active() => {}
            _ => return false,
        }

        self.prune_at(coord);
        if self.occupancy.contains_key(&coord) {
            return false;
        }

        self.occupancy.insert(coord, id);
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.set_lifecycle(Lifecycle::Active);
            piece.set_coord(coord);
        }
        debug!(entity = %id, %coord, "piece restored");
        true
    }

    /// Overwrite pieces with previously recorded values.
    ///
    /// Each given piece replaces the board's piece with the same id,
    /// including its position and lifecycle. The occupancy index is
    /// updated to match.
    pub fn rewind(&mut self, states: &[Piece]) {
        for state in states {
            if let Some(current) = self.pieces.get(&state.id) {
                let coord = current.coord();
                if current.is_active() && self.occupancy.get(&coord) == Some(&state.id) {
                    self.occupancy.remove(&coord);
                }
            }
        }
        for state in states {
            if state.is_active() {
                self.occupancy.insert(state.coord(), state.id);
            }
            self.pieces.insert(state.id, state.clone());
        }
    }

    /// Drop the occupancy entry at `coord` if it is stale.
    fn prune_at(&mut self, coord: Coord) -> bool {
        let Some(id) = self.stale_entry(coord) else {
            return false;
        };
        warn!(%coord, entity = %id, "pruning stale occupancy entry");
        self.occupancy.remove(&coord);
        true
    }

    /// Remove every stale occupancy entry. Returns how many were dropped.
    pub fn prune_stale(&mut self) -> usize {
        let coords: Vec<Coord> = self.occupancy.keys().copied().collect();
        coords.into_iter().filter(|&coord| self.prune_at(coord)).count()
    }

    /// Rebuild the occupancy index from the active pieces.
    pub fn reindex(&mut self) {
        let occupancy: OrdMap<Coord, EntityId> = self
            .pieces
            .values()
            .filter(|piece| piece.is_active())
            .map(|piece| (piece.coord(), piece.id))
            .collect();
        if occupancy != self.occupancy {
            warn!(before = self.occupancy.len(), after = occupancy.len(), "occupancy index rebuilt");
        }
        self.occupancy = occupancy;
    }

    /// Remove every piece and reset id allocation.
    pub fn clear(&mut self) {
        self.pieces.clear();
        self.occupancy.clear();
        self.next_id = 1;
    }

    /// Canonical byte encoding of the full board state.
    ///
    /// Two boards encode identically exactly when every piece and
    /// occupancy entry matches.
    pub fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    #[cfg(test)]
    pub(crate) fn corrupt_occupancy(&mut self, coord: Coord, id: EntityId) {
        self.occupancy.insert(coord, id);
    }
}
