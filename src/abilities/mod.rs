//! Abilities: per-piece modifiers, faction modifiers and the effects
//! they produce.
//!
//! ## Key Types
//!
//! - [`Modifier`]: instance-scoped ability with lifecycle and combat hooks
//! - [`FactionRuntime`]: side-wide abilities and their state
//! - [`Effect`]: an atomic change requested by a hook
//! - [`EffectResolver`]: applies effects and emits events
//! - [`HookDispatcher`]: runs hooks in a fixed, deterministic order

pub mod dispatch;
pub mod effect;
pub mod faction;
pub mod hint;
pub mod modifier;
pub mod resolver;

pub use dispatch::HookDispatcher;
pub use effect::{Effect, EffectBatch};
pub use faction::{FactionModifier, FactionRuntime};
pub use hint::{HintColor, HintTile};
pub use modifier::{HookContext, Modifier};
pub use resolver::{EffectResolver, ResolveResult};
