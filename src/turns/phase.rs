//! Turn phases and the transitions between them.
//!
//! ```text
//! Preparation ──► PlayerTurn ──► EnemyTurn ──► Cleanup
//!                     ▲                           │
//!                     └───────────────────────────┘
//! ```
//!
//! Once an [`Outcome`] is recorded the phase is frozen and every further
//! transition fails with [`PhaseError::Frozen`].

use serde::{Deserialize, Serialize};

use crate::error::PhaseError;

use super::outcome::Outcome;

/// Where the encounter is in its turn loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    Preparation,
    PlayerTurn,
    EnemyTurn,
    Cleanup,
}

impl TurnPhase {
    /// Is `self -> to` an edge of the turn loop?
    #[must_use]
    pub const fn can_transition_to(self, to: TurnPhase) -> bool {
        matches!(
            (self, to),
            (TurnPhase::Preparation, TurnPhase::PlayerTurn)
                | (TurnPhase::PlayerTurn, TurnPhase::EnemyTurn)
                | (TurnPhase::EnemyTurn, TurnPhase::Cleanup)
                | (TurnPhase::Cleanup, TurnPhase::PlayerTurn)
        )
    }
}

/// Phase plus the counters external drivers key off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    phase: TurnPhase,
    /// Player turns started, 1-based once the encounter begins.
    pub turn_number: u32,
    pub enemy_turns_started: u32,
    pub rounds_completed: u32,
    outcome: Option<Outcome>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: TurnPhase::Preparation,
            turn_number: 0,
            enemy_turns_started: 0,
            rounds_completed: 0,
            outcome: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Move to the next phase. Returns the phase left behind.
    pub fn transition(&mut self, to: TurnPhase) -> Result<TurnPhase, PhaseError> {
        if self.is_over() {
            return Err(PhaseError::Frozen);
        }
        let from = self.phase;
        if !from.can_transition_to(to) {
            return Err(PhaseError::IllegalTransition { from, to });
        }

        self.phase = to;
        match to {
            TurnPhase::PlayerTurn => self.turn_number += 1,
            TurnPhase::EnemyTurn => self.enemy_turns_started += 1,
            TurnPhase::Cleanup => self.rounds_completed += 1,
            TurnPhase::Preparation => {}
        }
        Ok(from)
    }

    /// Record the outcome. Only the first call has any effect; returns
    /// whether this call was it.
    pub fn conclude(&mut self, outcome: Outcome) -> bool {
        if self.is_over() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_loop() {
        let mut state = TurnState::new();
        assert_eq!(state.phase(), TurnPhase::Preparation);

        assert_eq!(state.transition(TurnPhase::PlayerTurn), Ok(TurnPhase::Preparation));
        assert_eq!(state.turn_number, 1);

        state.transition(TurnPhase::EnemyTurn).unwrap();
        assert_eq!(state.enemy_turns_started, 1);
        state.transition(TurnPhase::Cleanup).unwrap();
        assert_eq!(state.rounds_completed, 1);
        state.transition(TurnPhase::PlayerTurn).unwrap();
        assert_eq!(state.turn_number, 2);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut state = TurnState::new();
        assert_eq!(
            state.transition(TurnPhase::EnemyTurn),
            Err(PhaseError::IllegalTransition {
                from: TurnPhase::Preparation,
                to: TurnPhase::EnemyTurn,
            })
        );

        state.transition(TurnPhase::PlayerTurn).unwrap();
        assert!(state.transition(TurnPhase::Preparation).is_err());
        assert!(state.transition(TurnPhase::Cleanup).is_err());
        assert!(state.transition(TurnPhase::PlayerTurn).is_err());
        assert_eq!(state.phase(), TurnPhase::PlayerTurn);
    }

    #[test]
    fn test_outcome_freezes() {
        let mut state = TurnState::new();
        state.transition(TurnPhase::PlayerTurn).unwrap();

        assert!(state.conclude(Outcome::Victory));
        assert!(!state.conclude(Outcome::Defeat));
        assert_eq!(state.outcome(), Some(Outcome::Victory));
        assert_eq!(state.transition(TurnPhase::EnemyTurn), Err(PhaseError::Frozen));
        assert_eq!(state.phase(), TurnPhase::PlayerTurn);
    }
}
