//! Mutable encounter state.
//!
//! ## GameState
//!
//! Everything a command can change and undo must restore:
//! - Board (pieces and occupancy)
//! - Faction runtimes (faction-scoped ability state)
//! - RNG stream position
//!
//! Turn bookkeeping (phase, AP, lives) lives with the encounter, which
//! decides when commands are allowed at all.

use crate::abilities::FactionRuntime;
use crate::board::Board;

use super::config::EncounterConfig;
use super::entity::TeamMap;
use super::rng::GameRng;

/// Board, faction state and RNG.
///
/// Uses `im` persistent maps inside [`Board`], so cloning is cheap enough
/// to snapshot before every command and for intent previews.
#[derive(Clone, Debug)]
pub struct GameState {
    pub board: Board,
    pub factions: TeamMap<FactionRuntime>,
    pub rng: GameRng,
}

impl GameState {
    /// Create an empty state for the given configuration.
    #[must_use]
    pub fn new(config: &EncounterConfig, seed: u64) -> Self {
        Self {
            board: Board::new(config.columns, config.rows, config.tile_size),
            factions: TeamMap::new(FactionRuntime::new),
            rng: GameRng::new(seed),
        }
    }
}
