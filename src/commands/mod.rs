//! Commands with exact undo and redo.
//!
//! ## Key Types
//!
//! - [`Command`]: a validated, reversible action
//! - [`CommandRecord`]: what an executed command changed
//! - [`CommandHistory`]: undo and redo stacks for the player's turn

pub mod command;
pub mod history;

pub use command::{Command, CommandAction, CommandContext, CommandCosts, CommandRecord};
pub use history::CommandHistory;
