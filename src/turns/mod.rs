//! Turn structure and encounter orchestration.
//!
//! ## Key Types
//!
//! - [`Encounter`]: owns one fight and drives the turn loop
//! - [`TurnPhase`] / [`TurnState`]: the phase machine and its counters
//! - [`ActionPoints`]: the player's per-turn budget
//! - [`EnemyTurnDriver`]: paced, one-enemy-at-a-time enemy turn
//! - [`Intent`]: preview of what each enemy will do
//! - [`WaveDirector`]: fires scripted waves as their triggers come due

pub mod ap;
pub mod encounter;
pub mod enemy;
pub mod intent;
pub mod outcome;
pub mod phase;
pub mod waves;

pub use ap::ActionPoints;
pub use encounter::Encounter;
pub use enemy::{EnemyAction, EnemyAi, EnemyStep, EnemyTurnDriver};
pub use intent::{forecast, Intent, IntentKind};
pub use outcome::Outcome;
pub use phase::{TurnPhase, TurnState};
pub use waves::{SpawnRequest, Wave, WaveDirector, WaveTrigger};
