//! Entity identification and factions.
//!
//! Every piece placed on a board gets a unique `EntityId`. Ids are
//! allocated by the board and never reused within an encounter, so a
//! soft-captured piece keeps its id and can be restored by undo.
//!
//! ## Teams
//!
//! There are exactly two factions. The player side's home row is row 0
//! and it advances toward increasing `y`; the enemy side advances toward
//! row 0.
//!
//! ```
//! use rust_tactics::core::Team;
//!
//! assert_eq!(Team::Player.opponent(), Team::Enemy);
//! assert_eq!(Team::Player.forward(), 1);
//! assert_eq!(Team::Enemy.forward(), -1);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a piece on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create an entity id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// One of the two factions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// The human-controlled side.
    Player,
    /// The AI-controlled side.
    Enemy,
}

impl Team {
    /// Both teams, player first.
    pub const BOTH: [Team; 2] = [Team::Player, Team::Enemy];

    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }

    /// Row delta of one forward step for this team.
    #[must_use]
    pub const fn forward(self) -> i32 {
        match self {
            Team::Player => 1,
            Team::Enemy => -1,
        }
    }

    /// Is this the player-controlled side?
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Team::Player)
    }

    /// Index for two-slot per-team storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Team::Player => 0,
            Team::Enemy => 1,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Player => write!(f, "Player"),
            Team::Enemy => write!(f, "Enemy"),
        }
    }
}

/// Per-team data storage with O(1) access.
///
/// ```
/// use rust_tactics::core::{Team, TeamMap};
///
/// let mut lives: TeamMap<u32> = TeamMap::with_value(3);
/// lives[Team::Player] -= 1;
/// assert_eq!(lives[Team::Player], 2);
/// assert_eq!(lives[Team::Enemy], 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamMap<T> {
    data: [T; 2],
}

impl<T> TeamMap<T> {
    /// Create with a factory function.
    pub fn new(factory: impl Fn(Team) -> T) -> Self {
        Self {
            data: [factory(Team::Player), factory(Team::Enemy)],
        }
    }

    /// Create with the same value for both teams.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Iterate over (Team, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Team, &T)> {
        Team::BOTH.into_iter().zip(self.data.iter())
    }
}

impl<T> std::ops::Index<Team> for TeamMap<T> {
    type Output = T;

    fn index(&self, team: Team) -> &Self::Output {
        &self.data[team.index()]
    }
}

impl<T> std::ops::IndexMut<Team> for TeamMap<T> {
    fn index_mut(&mut self, team: Team) -> &mut Self::Output {
        &mut self.data[team.index()]
    }
}
