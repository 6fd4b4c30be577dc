//! # Execution Engine
//!
//! Interpreter that walks a `CommandSequence` one command at a time.
//!
//! ## Core Principles
//!
//! 1. **One run at a time**: `execute()` on an executing engine is rejected
//! 2. **Single suspension point**: the loop parks until the active command
//!    signals completion through the pending-jump register
//! 3. **Host-driven**: the host calls `tick()` once per frame; synchronous
//!    commands never need a tick
//! 4. **Synchronous stop**: `stop()` returns with the engine idle
//!
//! The run loop itself lives in `exec_loop`.

pub mod continuation;
pub mod exec_loop;

#[cfg(test)]
mod tests;

pub use continuation::Continuation;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::sequence::CommandSequence;
use crate::signals::SignalBus;
use crate::types::{EngineId, EngineRef, EngineSnapshot, EngineState, Jump, Launch, Location};
use continuation::JumpRegister;
use std::sync::Arc;
use tracing::warn;

/// Invoked once when a run reaches the end of its sequence
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/* ===================== Engine ===================== */

pub struct ExecutionEngine {
    id: EngineId,
    name: String,
    sequence: CommandSequence,
    state: EngineState,

    /// Position of the command currently executing (or suspended)
    active: Option<usize>,
    previous_active_index: Option<usize>,

    register: JumpRegister,

    /// Incremented once per accepted `execute()`
    run_count: u64,
    on_complete: Option<CompletionCallback>,

    /// Set when a command hook returned an error; cleared by `stop()`
    faulted: bool,

    bus: Option<Arc<dyn SignalBus>>,
    config: EngineConfig,
}

impl ExecutionEngine {
    pub fn new(name: impl Into<String>, mut sequence: CommandSequence) -> Self {
        let id = EngineId::new();
        sequence.adopt(id);
        sequence.refresh();

        ExecutionEngine {
            id,
            name: name.into(),
            sequence,
            state: EngineState::Idle,
            active: None,
            previous_active_index: None,
            register: JumpRegister::default(),
            run_count: 0,
            on_complete: None,
            faulted: false,
            bus: None,
            config: EngineConfig::default(),
        }
    }

    pub fn with_signal_bus(mut self, bus: Arc<dyn SignalBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /* ===================== Accessors ===================== */

    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_executing(&self) -> bool {
        self.state == EngineState::Executing
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn previous_active_index(&self) -> Option<usize> {
        self.previous_active_index
    }

    pub fn run_count(&self) -> u64 {
        self.run_count
    }

    pub fn sequence(&self) -> &CommandSequence {
        &self.sequence
    }

    /// Structural access to the sequence. Refused while a run is in flight,
    /// since edits would invalidate the cursor.
    pub fn sequence_mut(&mut self) -> Result<&mut CommandSequence, EngineError> {
        if self.is_executing() {
            return Err(EngineError::Busy {
                engine: self.name.clone(),
            });
        }
        Ok(&mut self.sequence)
    }

    /// Enable or disable a command. Allowed mid-run: the skip rule reads the
    /// flag when the cursor reaches the command.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), EngineError> {
        if self.sequence.set_enabled(index, enabled) {
            Ok(())
        } else {
            Err(EngineError::IndexOutOfRange {
                index,
                len: self.sequence.len(),
            })
        }
    }

    pub fn find_label(&self, key: &str) -> Option<usize> {
        self.sequence.find_label(key)
    }

    pub fn location_of(&self, index: usize) -> Option<Location> {
        self.sequence.get(index).map(|command| Location {
            engine: self.name.clone(),
            index,
            command: command.name().to_string(),
        })
    }

    pub fn engine_ref(&self) -> EngineRef {
        EngineRef {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            id: self.id,
            name: self.name.clone(),
            state: self.state,
            active: self.active,
            previous_active_index: self.previous_active_index,
            run_count: self.run_count,
            total: self.sequence.len(),
        }
    }

    /* ===================== Running ===================== */

    /// Start a run at `start`.
    ///
    /// Commands run until one suspends or the sequence ends; an all
    /// synchronous sequence therefore completes before this returns.
    pub fn execute(&mut self, start: usize) -> Result<Launch, EngineError> {
        self.start_run(start, None)
    }

    /// Start a run at `start`, calling `on_complete` when it reaches the end
    /// of the sequence. The callback is dropped unfired if the run is
    /// rejected, stopped or superseded.
    pub fn execute_with(
        &mut self,
        start: usize,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Result<Launch, EngineError> {
        self.start_run(start, Some(Box::new(on_complete)))
    }

    /// Start a run at the first label matching `key`
    pub fn execute_label(
        &mut self,
        key: &str,
        on_complete: Option<CompletionCallback>,
    ) -> Result<Launch, EngineError> {
        if self.sequence.needs_refresh() && !self.is_executing() {
            self.sequence.refresh();
        }
        let Some(start) = self.sequence.find_label(key) else {
            warn!(engine = %self.name, label = key, "label not found; run not started");
            return Ok(Launch::LabelNotFound);
        };
        self.start_run(start, on_complete)
    }

    /// Abort the current run.
    ///
    /// The active command gets `on_stop_executing()`, outstanding
    /// continuations are disarmed and the engine is idle when this returns.
    /// The run's completion callback is dropped unfired. No-op when idle.
    pub fn stop(&mut self) {
        if !self.is_executing() {
            return;
        }

        if let Some(index) = self.active {
            if let Some(slot) = self.sequence.slot_mut(index) {
                slot.meta.is_executing = false;
                slot.command.on_stop_executing();
            }
        }

        self.register.abort();
        self.on_complete = None;
        self.enter_idle();
    }

    /// Move the current run to `index`, interrupting the active command.
    ///
    /// `index == len()` is allowed and ends the run normally.
    pub fn redirect(&mut self, index: usize) -> Result<(), EngineError> {
        if !self.is_executing() {
            return Err(EngineError::NotExecuting {
                engine: self.name.clone(),
            });
        }
        let len = self.sequence.len();
        if index > len {
            return Err(EngineError::IndexOutOfRange { index, len });
        }

        // A command that already signalled has finished; nothing to interrupt
        if !self.register.is_pending() {
            if let Some(active) = self.active {
                if let Some(slot) = self.sequence.slot_mut(active) {
                    slot.command.on_stop_executing();
                }
            }
        }

        self.faulted = false;
        self.register.set(Jump::To(index));
        let run = self.run_count;
        self.drive(run)
    }

    /// Redirect the current run to a label. Returns the resolved position,
    /// or `None` (logged) if the label does not exist.
    pub fn redirect_to_label(&mut self, key: &str) -> Result<Option<usize>, EngineError> {
        let Some(target) = self.sequence.find_label(key) else {
            warn!(engine = %self.name, label = key, "label not found; run not redirected");
            return Ok(None);
        };
        self.redirect(target)?;
        Ok(Some(target))
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("run_count", &self.run_count)
            .field("sequence", &self.sequence)
            .finish()
    }
}
