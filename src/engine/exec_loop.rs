//! Core run loop
//!
//! ## Function Organization
//! 1. start_run() - Idle -> Executing, then enters the loop
//! 2. tick() - host hook, polls the suspended command and re-enters the loop
//! 3. drive() - the loop: take jump, skip inert entries, activate, execute
//! 4. finish() / enter_idle() - completion handling

use super::{CompletionCallback, ExecutionEngine};
use crate::command::{EngineRequest, ExecContext};
use crate::errors::{CommandError, EngineError};
use crate::types::{EngineState, Jump, Launch, Location};
use tracing::{debug, error, warn};

/// Which command hook to invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hook {
    Execute,
    Tick,
}

impl ExecutionEngine {
    /* ===================== Public API ===================== */

    /// Advance the engine by one host tick.
    ///
    /// The suspended command's `on_tick()` runs first (unless it has already
    /// signalled), then the loop resumes if a jump is pending. Idle or
    /// faulted engines ignore ticks.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        if !self.is_executing() || self.faulted {
            return Ok(());
        }
        let run = self.run_count;

        if !self.register.is_pending() {
            if let (Some(active), Some(ticket)) = (self.active, self.register.armed()) {
                self.invoke(active, ticket, Hook::Tick)?;
            }
        }

        self.drive(run)
    }

    /* ===================== Run Lifecycle ===================== */

    pub(super) fn start_run(
        &mut self,
        start: usize,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Launch, EngineError> {
        if self.state != EngineState::Idle {
            warn!(
                engine = %self.name,
                start,
                active = ?self.active,
                "sequence is already executing; run request ignored"
            );
            return Ok(Launch::Rejected);
        }

        self.on_complete = on_complete;
        if self.sequence.needs_refresh() {
            self.sequence.refresh();
        }

        self.run_count += 1;
        let run = self.run_count;
        self.state = EngineState::Executing;
        self.faulted = false;
        debug!(engine = %self.name, run, start, "run started");

        if let Some(bus) = &self.bus {
            bus.on_sequence_start(&self.engine_ref());
        }

        self.register.set(Jump::To(start));
        self.drive(run)?;
        Ok(Launch::Started)
    }

    /// The run loop.
    ///
    /// Returns when the active command suspends, the sequence is exhausted,
    /// or the run has been stopped or superseded by a newer one.
    pub(super) fn drive(&mut self, run: u64) -> Result<(), EngineError> {
        loop {
            if !self.is_executing() || self.run_count != run {
                return Ok(());
            }

            // Suspension point: nothing to do until the active command signals
            let Some(jump) = self.register.take() else {
                return Ok(());
            };

            if let Some(active) = self.active {
                self.sequence.set_executing(active, false);
            }

            let total = self.sequence.len();
            let mut cursor = jump.target();
            while cursor < total && self.sequence.is_skipped(cursor) {
                cursor += 1;
            }

            if cursor >= total {
                self.finish(run);
                return Ok(());
            }

            self.previous_active_index = self.active;
            self.active = Some(cursor);
            self.sequence.set_executing(cursor, true);

            if let (Some(bus), Some(command)) = (&self.bus, self.sequence.get(cursor)) {
                bus.on_command_execute(&self.engine_ref(), command, cursor, total);
            }

            let ticket = self.register.arm();
            self.invoke(cursor, ticket, Hook::Execute)?;
        }
    }

    /// Run one hook of the command at `index`, then apply any engine request
    /// it made
    fn invoke(&mut self, index: usize, ticket: u64, hook: Hook) -> Result<(), EngineError> {
        let total = self.sequence.len();
        let Some((slot, layout)) = self.sequence.split_for_hook(index) else {
            return Ok(());
        };

        let mut ctx = ExecContext::new(index, total, ticket, &self.register, layout);
        if hook == Hook::Execute {
            debug!(engine = %self.name, index, command = slot.command.name(), "execute");
        }
        let result = match hook {
            Hook::Execute => slot.command.execute(&mut ctx),
            Hook::Tick => slot.command.on_tick(&mut ctx),
        };
        let request = ctx.take_request();

        if let Err(source) = result {
            return Err(self.command_failed(index, source));
        }

        match request {
            Some(EngineRequest::Stop) => {
                debug!(engine = %self.name, index, "stop requested by command");
                self.stop();
            }
            Some(EngineRequest::Restart { at }) => {
                debug!(engine = %self.name, index, at, "restart requested by command");
                self.stop();
                self.start_run(at, None)?;
            }
            None => {}
        }
        Ok(())
    }

    /// Leave the engine unresolved: still executing, faulting command active
    fn command_failed(&mut self, index: usize, source: CommandError) -> EngineError {
        self.faulted = true;
        self.register.disarm();

        let location = self.location_of(index).unwrap_or_else(|| Location {
            engine: self.name.clone(),
            index,
            command: "<removed>".to_string(),
        });
        if self.config.diagnostics {
            error!(%location, error = %source, "command failed");
        }
        EngineError::CommandFailed { location, source }
    }

    /* ===================== Completion ===================== */

    /// Normal end of a run. A run superseded by a nested one does nothing;
    /// the newer run owns the transition to idle.
    fn finish(&mut self, run: u64) {
        if !self.is_executing() || self.run_count != run {
            return;
        }
        self.enter_idle();
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    pub(super) fn enter_idle(&mut self) {
        self.state = EngineState::Idle;
        self.active = None;
        self.faulted = false;
        debug!(engine = %self.name, run = self.run_count, "run ended");

        if let Some(bus) = &self.bus {
            bus.on_sequence_end(&self.engine_ref());
        }
    }
}
