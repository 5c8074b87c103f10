//! Action point economy.
//!
//! The player gets a fixed budget each turn. Commands spend from it and
//! undo refunds exactly what was spent, so the value always stays in
//! `0..=max`.

use serde::{Deserialize, Serialize};

/// Per-turn action budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPoints {
    current: u32,
    max: u32,
}

impl ActionPoints {
    /// A full budget of `max` points.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub const fn current(self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn max(self) -> u32 {
        self.max
    }

    #[must_use]
    pub const fn can_afford(self, cost: u32) -> bool {
        self.current >= cost
    }

    /// Spend `cost` points. Fails without change if the budget is short.
    pub fn spend(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Give points back, never beyond the maximum.
    pub fn refund(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Refill to the maximum.
    pub fn reset(&mut self) {
        self.current = self.max;
    }
}
