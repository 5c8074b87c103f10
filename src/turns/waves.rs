//! Scripted spawn waves.
//!
//! Waves are owned by the encounter driver, not the encounter: the
//! encounter only knows how many waves are still outstanding (for the
//! victory check) and how to spawn one. [`WaveDirector`] decides *when*
//! by polling counters the encounter exposes.
//!
//! ```
//! use rust_tactics::core::{Coord, EncounterConfig, Team};
//! use rust_tactics::pieces::{DefinitionId, MovementRule, PieceCatalog, PieceDefinition};
//! use rust_tactics::turns::{Encounter, SpawnRequest, Wave, WaveDirector, WaveTrigger};
//!
//! let mut catalog = PieceCatalog::new();
//! catalog.register(PieceDefinition::new(DefinitionId::new(1), "Pawn", 2, 1).with_movement(MovementRule::pawn())).unwrap();
//! let mut encounter = Encounter::new(EncounterConfig::default(), catalog, 7).unwrap();
//!
//! let pawn = |x| SpawnRequest::new(DefinitionId::new(1), Coord::new(x, 7), Team::Enemy);
//! let mut director = WaveDirector::new(vec![
//!     Wave::new(WaveTrigger::Immediate, vec![pawn(0), pawn(1)]),
//!     Wave::new(WaveTrigger::AfterEnemyTurns(2), vec![pawn(4)]),
//! ]);
//! director.attach(&mut encounter);
//!
//! assert_eq!(director.drive(&mut encounter).unwrap(), 1);
//! assert_eq!(encounter.board().count_active(Team::Enemy), 2);
//! assert_eq!(encounter.waves_outstanding(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Coord, Team};
use crate::error::SpawnError;
use crate::pieces::DefinitionId;

use super::encounter::Encounter;

/// When a wave becomes due.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum WaveTrigger {
    /// Due as soon as it is polled.
    Immediate,
    /// Due once at least `n` enemy turns have started.
    AfterEnemyTurns(u32),
    /// Due once at least `n` rounds have completed.
    AfterRounds(u32),
    /// Due when no enemy is active.
    BoardCleared,
}

impl WaveTrigger {
    /// Is the trigger satisfied by the encounter's current counters?
    #[must_use]
    pub fn is_due(self, encounter: &Encounter) -> bool {
        match self {
            WaveTrigger::Immediate => true,
            WaveTrigger::AfterEnemyTurns(n) => encounter.enemy_turns_started() >= n,
            WaveTrigger::AfterRounds(n) => encounter.rounds_completed() >= n,
            WaveTrigger::BoardCleared => encounter.is_board_cleared(),
        }
    }
}

/// One piece to spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub definition: DefinitionId,
    pub coord: Coord,
    pub team: Team,
}

impl SpawnRequest {
    #[must_use]
    pub const fn new(definition: DefinitionId, coord: Coord, team: Team) -> Self {
        Self {
            definition,
            coord,
            team,
        }
    }
}

/// A group of spawns sharing a trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub trigger: WaveTrigger,
    #[serde(default)]
    pub spawns: Vec<SpawnRequest>,
}

impl Wave {
    #[must_use]
    pub fn new(trigger: WaveTrigger, spawns: Vec<SpawnRequest>) -> Self {
        Self { trigger, spawns }
    }
}

/// Fires scripted waves as their triggers come due.
#[derive(Clone, Debug, Default)]
pub struct WaveDirector {
    waves: Vec<Wave>,
    fired: Vec<bool>,
}

impl WaveDirector {
    #[must_use]
    pub fn new(waves: Vec<Wave>) -> Self {
        let fired = vec![false; waves.len()];
        Self { waves, fired }
    }

    /// Waves not fired yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.fired.iter().filter(|fired| !**fired).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending() == 0
    }

    /// Tell the encounter how many waves to wait for before victory.
    pub fn attach(&self, encounter: &mut Encounter) {
        let pending = u32::try_from(self.pending()).unwrap_or(u32::MAX);
        encounter.expect_waves(pending);
    }

    /// Unfired waves whose trigger is satisfied, in script order.
    #[must_use]
    pub fn poll(&self, encounter: &Encounter) -> Vec<&Wave> {
        self.waves
            .iter()
            .zip(&self.fired)
            .filter(|(wave, fired)| !**fired && wave.trigger.is_due(encounter))
            .map(|(wave, _)| wave)
            .collect()
    }

    /// Spawn every due wave. Returns how many fired.
    ///
    /// A wave that fails to spawn stays unfired and the error is
    /// returned; waves before it in script order have already fired.
    pub fn drive(&mut self, encounter: &mut Encounter) -> Result<usize, SpawnError> {
        let mut count = 0;
        for index in 0..self.waves.len() {
            if self.fired[index] || !self.waves[index].trigger.is_due(encounter) {
                continue;
            }
            encounter.spawn_wave(&self.waves[index])?;
            self.fired[index] = true;
            count += 1;
            debug!(wave = index, trigger = ?self.waves[index].trigger, "wave fired");
        }
        Ok(count)
    }
}
