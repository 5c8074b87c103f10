//! Combat resolution.
//!
//! ## Key Types
//!
//! - [`CombatResolver`]: runs the attack pipeline
//! - [`AttackContext`]: the mutable record hooks adjust
//! - [`StrikeKind`]: one-way or simultaneous exchange
//! - [`CombatReport`]: the published result

pub mod context;
pub mod report;
pub mod resolver;

pub use context::{AttackContext, CombatRole, StrikeKind};
pub use report::CombatReport;
pub use resolver::CombatResolver;
