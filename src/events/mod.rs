//! Event notifications and the bus that delivers them.
//!
//! ## Key Types
//!
//! - [`GameEvent`]: every observable state change
//! - [`Topic`]: routing key for subscriptions
//! - [`EventBus`]: synchronous dispatcher with an optional recording log

pub mod bus;
pub mod event;

pub use bus::{EventBus, SubscriptionId};
pub use event::{GameEvent, MoveReason, Topic};
