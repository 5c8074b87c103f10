//! Undo and redo stacks.

use tracing::{debug, warn};

use crate::error::{ActionRejected, InvariantViolation, TacticsError};
use crate::events::{GameEvent, MoveReason};

use super::command::{Command, CommandAction, CommandContext};

/// Executed commands available for undo, and undone commands available
/// for redo.
///
/// Executing a new command discards the redo stack. Any invariant
/// failure discards both stacks.
#[derive(Clone, Debug, Default)]
pub struct CommandHistory {
    undo: Vec<Command>,
    redo: Vec<Command>,
}

impl CommandHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// The most recently executed command still on the undo stack.
    #[must_use]
    pub fn last(&self) -> Option<&Command> {
        self.undo.last()
    }

    /// Execute a command and record it.
    ///
    /// A stale occupancy entry under the command aborts it before
    /// validation, discards the history and rebuilds the index.
    pub fn execute(&mut self, mut command: Command, ctx: &mut CommandContext<'_>) -> Result<(), TacticsError> {
        if let Err(violation) = command.check_occupancy(&ctx.state.board) {
            self.abandon(ctx, &violation);
            ctx.state.board.reindex();
            return Err(violation.into());
        }
        command.execute(ctx)?;
        self.push(command);
        Ok(())
    }

    /// Record an executed command.
    pub fn push(&mut self, command: Command) {
        self.redo.clear();
        self.undo.push(command);
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Revert the most recent command.
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandAction, TacticsError> {
        let Some(mut command) = self.undo.pop() else {
            return Err(ActionRejected::NothingToUndo.into());
        };
        let action = command.action();

        if let Err(violation) = command.undo(ctx) {
            self.abandon(ctx, &violation);
            return Err(violation.into());
        }

        ctx.bus.publish(GameEvent::CommandUndone { action });
        self.redo.push(command);
        Ok(action)
    }

    /// Re-apply the most recently undone command.
    ///
    /// The command is validated again; if it no longer applies the
    /// history is discarded.
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> Result<CommandAction, TacticsError> {
        let Some(mut command) = self.redo.pop() else {
            return Err(ActionRejected::NothingToRedo.into());
        };
        let action = command.action();

        if let Err(violation) = command.check_occupancy(&ctx.state.board) {
            self.abandon(ctx, &violation);
            ctx.state.board.reindex();
            return Err(violation.into());
        }

        let reason = std::mem::replace(&mut ctx.reason, MoveReason::Redo);
        let result = command.execute(ctx).map(|_| ());
        ctx.reason = reason;

        if let Err(rejected) = result {
            let violation = InvariantViolation::RedoRejected(rejected);
            self.abandon(ctx, &violation);
            return Err(violation.into());
        }

        ctx.bus.publish(GameEvent::CommandRedone { action });
        self.undo.push(command);
        debug!(?action, "command redone");
        Ok(action)
    }

    fn abandon(&mut self, ctx: &mut CommandContext<'_>, violation: &InvariantViolation) {
        warn!(%violation, undo = self.undo.len(), redo = self.redo.len(), "clearing command history");
        self.clear();
        ctx.bus.publish(GameEvent::HistoryCleared);
    }
}
