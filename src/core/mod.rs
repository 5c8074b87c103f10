//! Core engine types: coordinates, entities, teams, RNG, configuration
//! and the mutable state bundle.
//!
//! Apart from [`GameState`], these are the leaves of the dependency
//! graph. Nothing in here knows about rules, turns or combat.

pub mod config;
pub mod coord;
pub mod entity;
pub mod rng;
pub mod state;

pub use config::EncounterConfig;
pub use coord::{Coord, Direction};
pub use entity::{EntityId, Team, TeamMap};
pub use rng::{GameRng, GameRngState};
pub use state::GameState;
