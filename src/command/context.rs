//! Execution context handed to command hooks

use crate::engine::continuation::{Continuation, JumpRegister};
use crate::sequence::Layout;
use crate::types::Jump;

/// Engine-level action a command may request from inside a hook.
///
/// Requests are applied by the engine after the hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRequest {
    /// Stop the whole run, as `ExecutionEngine::stop()` would
    Stop,
    /// Stop the run, then start a new one at `at`. The new run supersedes the
    /// current one, which therefore never reports completion.
    Restart { at: usize },
}

/// View of the engine available to the active command
pub struct ExecContext<'a> {
    index: usize,
    total: usize,
    ticket: u64,
    register: &'a JumpRegister,
    layout: &'a Layout,
    request: Option<EngineRequest>,
}

impl<'a> ExecContext<'a> {
    pub(crate) fn new(
        index: usize,
        total: usize,
        ticket: u64,
        register: &'a JumpRegister,
        layout: &'a Layout,
    ) -> Self {
        ExecContext {
            index,
            total,
            ticket,
            register,
            layout,
            request: None,
        }
    }

    /// Position of the active command
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of commands in the sequence
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn indent_level(&self) -> usize {
        self.layout.indent_of(self.index).unwrap_or(0)
    }

    /* ===================== Completion ===================== */

    /// Signal completion and continue with the next command.
    ///
    /// Returns false if completion was already signalled.
    pub fn continue_next(&self) -> bool {
        self.register.signal(self.ticket, Jump::To(self.index + 1))
    }

    /// Signal completion and resume the run at `index`
    pub fn jump_to(&self, index: usize) -> bool {
        self.register.signal(self.ticket, Jump::To(index))
    }

    /// Handle for signalling completion after this hook has returned
    pub fn continuation(&self) -> Continuation {
        self.register.continuation(self.ticket, self.index)
    }

    /// Whether this command has already signalled completion
    pub fn has_signalled(&self) -> bool {
        self.register.is_pending()
    }

    /* ===================== Structure ===================== */

    pub fn find_label(&self, key: &str) -> Option<usize> {
        self.layout.labels().find(key)
    }

    /// Position of the close command matching this command's block
    pub fn find_block_end(&self) -> Option<usize> {
        self.layout.block_end(self.index)
    }

    /* ===================== Engine Requests ===================== */

    pub fn stop_engine(&mut self) {
        self.request = Some(EngineRequest::Stop);
    }

    pub fn restart_at(&mut self, index: usize) {
        self.request = Some(EngineRequest::Restart { at: index });
    }

    pub(crate) fn take_request(&mut self) -> Option<EngineRequest> {
        self.request.take()
    }
}
