//! # Command Contract
//!
//! A command is one unit of scripted behavior in a sequence. The engine
//! only ever talks to commands through the `Command` trait:
//!
//! - `execute()` begins the command's effect and may signal completion
//!   before returning (synchronous) or later through a `Continuation`
//!   (asynchronous)
//! - `on_tick()` is called once per host tick while the command is suspended
//! - `on_stop_executing()` releases resources when the engine is stopped
//! - `kind()`, `is_open_block()` and `is_close_block()` describe structure
//!
//! Disabled commands and inert kinds (comments, labels) are skipped by the
//! run loop and never have `execute()` called.

pub mod builtin;
pub mod context;

pub use builtin::{Comment, End, Goto, If, Label, StopSequence, Wait};
pub use context::{EngineRequest, ExecContext};

use crate::errors::CommandError;

/* ===================== Command Kind ===================== */

/// Structural variant of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind<'a> {
    /// Ordinary executable command
    Action,
    /// Authoring note, never executed
    Comment,
    /// Named jump target, never executed
    Label(&'a str),
}

impl CommandKind<'_> {
    /// Inert kinds are skipped over by the run loop
    pub fn is_inert(&self) -> bool {
        !matches!(self, CommandKind::Action)
    }
}

/* ===================== Command Trait ===================== */

pub trait Command: Send {
    /// Short name used in diagnostic locations
    fn name(&self) -> &str;

    fn kind(&self) -> CommandKind<'_> {
        CommandKind::Action
    }

    /// Opens a nested block; consulted only by the indentation pass
    fn is_open_block(&self) -> bool {
        false
    }

    /// Closes a nested block; consulted only by the indentation pass
    fn is_close_block(&self) -> bool {
        false
    }

    /// Begin the command's effect.
    ///
    /// Completion is signalled through `ctx.continue_next()`, `ctx.jump_to()`,
    /// or a `Continuation` obtained from `ctx.continuation()` and fired later.
    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError>;

    /// Called once per host tick while this command is active and has not
    /// yet signalled completion
    fn on_tick(&mut self, _ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        Ok(())
    }

    /// The engine was stopped while this command was executing.
    ///
    /// Must release anything the command acquired and must not signal
    /// completion; continuations issued to it are already disarmed.
    fn on_stop_executing(&mut self) {}
}
