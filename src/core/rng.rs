//! Deterministic random number generation.
//!
//! The only randomized rule in the engine is the forward-only jumper's
//! destination pick. Routing it through a seeded, capturable RNG keeps
//! encounters reproducible and lets undo rewind the stream so that redo
//! picks the same destination again.
//!
//! ```
//! use rust_tactics::core::GameRng;
//!
//! let landings = [(1, 2), (2, 1), (-1, 2), (-2, 1)];
//! let mut rng = GameRng::new(42);
//! let saved = rng.state();
//! let first = rng.choose(&landings).copied();
//!
//! rng.restore(&saved);
//! assert_eq!(rng.choose(&landings).copied(), first);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Get the current state for capture.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a captured state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }

    /// Rewind or fast-forward this stream to a captured state.
    pub fn restore(&mut self, state: &GameRngState) {
        *self = Self::from_state(state);
    }
}

/// Serializable RNG state.
///
/// Uses the ChaCha8 word position, so capture and restore are O(1)
/// regardless of how many numbers were drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}
