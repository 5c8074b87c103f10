//! Runtime piece state.
//!
//! A `Piece` is a definition copied onto the board: it carries its own
//! hit points, fortification, bleed stacks and ability state. Captured
//! pieces are flagged, never dropped, so undo can bring them back with
//! their exact pre-capture values.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::abilities::Modifier;
use crate::core::{Coord, EntityId, Team};
use crate::error::ConfigError;

use super::definition::{DefinitionId, PieceDefinition};
use super::movement::MovementRule;

/// Inline capacity for per-piece ability lists.
pub type ModifierList = SmallVec<[Modifier; 4]>;

/// Whether a piece is on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Occupies a tile and takes part in the rules.
    Active,
    /// Soft-captured: off the board but restorable.
    Captured,
}

/// A cyclic patrol path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolRoute {
    tiles: Vec<Coord>,
    index: usize,
}

impl PatrolRoute {
    /// Create a route positioned at its first tile.
    #[must_use]
    pub fn new(tiles: Vec<Coord>) -> Self {
        Self { tiles, index: 0 }
    }

    /// The tile the route currently points at.
    #[must_use]
    pub fn current(&self) -> Option<Coord> {
        self.tiles.get(self.index).copied()
    }

    /// The tile the route will point at after the next advance.
    #[must_use]
    pub fn peek_next(&self) -> Option<Coord> {
        if self.tiles.is_empty() {
            return None;
        }
        self.tiles.get((self.index + 1) % self.tiles.len()).copied()
    }

    /// Step to the next tile, wrapping at the end.
    pub fn advance(&mut self) -> Option<Coord> {
        if self.tiles.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.tiles.len();
        self.current()
    }

    /// All tiles, in patrol order.
    #[must_use]
    pub fn tiles(&self) -> &[Coord] {
        &self.tiles
    }
}

/// A piece on (or captured from) the board.
///
/// `coord` and `lifecycle` are private: only the board moves, captures
/// and restores pieces, so a piece's position and the occupancy index
/// never disagree for active pieces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Assigned by the board on placement.
    pub id: EntityId,
    pub definition: DefinitionId,
    pub name: String,
    pub team: Team,
    coord: Coord,
    pub max_hp: i32,
    pub current_hp: i32,
    pub attack: i32,
    /// Flat reduction applied to incoming damage.
    pub fortify: i32,
    /// Damage taken at the start of the owner's turn, one stack per tick.
    pub bleed: i32,
    pub moved_this_turn: bool,
    /// Cleared by the first move; gates the stepper bonus.
    pub first_move_available: bool,
    lifecycle: Lifecycle,
    pub movement: MovementRule,
    pub modifiers: ModifierList,
    pub patrol: Option<PatrolRoute>,
    pub leader: bool,
}

impl Piece {
    /// Copy a definition into a fresh runtime piece.
    ///
    /// The piece is unplaced: id and coordinate are assigned by
    /// [`Board::place`](crate::board::Board::place).
    pub fn from_definition(definition: &PieceDefinition, team: Team) -> Result<Self, ConfigError> {
        let movement = definition
            .movement
            .clone()
            .ok_or(ConfigError::MissingMovement(definition.id))?;

        Ok(Self {
            id: EntityId::new(0),
            definition: definition.id,
            name: definition.name.clone(),
            team,
            coord: Coord::new(0, 0),
            max_hp: definition.max_hp,
            current_hp: definition.max_hp,
            attack: definition.attack,
            fortify: 0,
            bleed: 0,
            moved_this_turn: false,
            first_move_available: true,
            lifecycle: Lifecycle::Active,
            movement,
            modifiers: definition.modifiers.iter().cloned().collect(),
            patrol: definition.patrol.clone().map(PatrolRoute::new),
            leader: definition.leader,
        })
    }

    /// Current tile. Meaningless while captured.
    #[must_use]
    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub(crate) fn set_coord(&mut self, coord: Coord) {
        self.coord = coord;
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Uses the patrol/barrage routine instead of the standard heuristic.
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.patrol.is_some()
    }

    /// Subtract hit points. Returns the amount applied.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        self.current_hp -= amount;
        amount
    }

    /// Restore hit points up to the maximum. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp).max(before);
        self.current_hp - before
    }

    /// Record a completed move: the stepper bonus is spent and any
    /// fortification built up while stationary is lost.
    pub fn mark_moved(&mut self) {
        self.moved_this_turn = true;
        self.first_move_available = false;
        self.fortify = 0;
    }

    /// Reset per-turn flags at the start of the owner's turn.
    pub fn begin_turn(&mut self) {
        self.moved_this_turn = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> PieceDefinition {
        PieceDefinition::new(DefinitionId::new(1), "Pawn", 3, 1)
            .with_movement(MovementRule::pawn())
            .with_modifier(Modifier::Armored { fortify: 1 })
    }

    #[test]
    fn test_from_definition() {
        let piece = Piece::from_definition(&definition(), Team::Enemy).unwrap();

        assert_eq!(piece.team, Team::Enemy);
        assert_eq!(piece.current_hp, 3);
        assert_eq!(piece.max_hp, 3);
        assert!(piece.first_move_available);
        assert!(piece.is_active());
        assert_eq!(piece.modifiers.len(), 1);
        assert!(!piece.is_boss());
    }

    #[test]
    fn test_from_definition_requires_movement() {
        let def = PieceDefinition::new(DefinitionId::new(9), "Blank", 1, 1);
        assert!(matches!(
            Piece::from_definition(&def, Team::Player),
            Err(ConfigError::MissingMovement(_))
        ));
    }

    #[test]
    fn test_damage_and_heal() {
        let mut piece = Piece::from_definition(&definition(), Team::Player).unwrap();

        assert_eq!(piece.take_damage(2), 2);
        assert_eq!(piece.current_hp, 1);
        assert_eq!(piece.take_damage(-4), 0);

        assert_eq!(piece.heal(5), 2);
        assert_eq!(piece.current_hp, 3);

        piece.take_damage(4);
        assert!(!piece.is_alive());
    }

    #[test]
    fn test_mark_moved_clears_fortify() {
        let mut piece = Piece::from_definition(&definition(), Team::Player).unwrap();
        piece.fortify = 2;

        piece.mark_moved();
        assert_eq!(piece.fortify, 0);
        assert!(!piece.first_move_available);
        assert!(piece.moved_this_turn);

        piece.begin_turn();
        assert!(!piece.moved_this_turn);
        assert!(!piece.first_move_available);
    }

    #[test]
    fn test_patrol_route_wraps() {
        let mut route = PatrolRoute::new(vec![Coord::new(0, 7), Coord::new(1, 7), Coord::new(2, 7)]);

        assert_eq!(route.current(), Some(Coord::new(0, 7)));
        assert_eq!(route.peek_next(), Some(Coord::new(1, 7)));
        assert_eq!(route.advance(), Some(Coord::new(1, 7)));
        assert_eq!(route.advance(), Some(Coord::new(2, 7)));
        assert_eq!(route.advance(), Some(Coord::new(0, 7)));

        let mut empty = PatrolRoute::new(Vec::new());
        assert_eq!(empty.advance(), None);
    }
}
