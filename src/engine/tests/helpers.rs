//! Test helpers for engine tests
//!
//! A recording signal bus, a scriptable command and a few builders.

use crate::command::{Command, ExecContext};
use crate::engine::{Continuation, ExecutionEngine};
use crate::errors::CommandError;
use crate::sequence::CommandSequence;
use crate::signals::SignalBus;
use crate::types::EngineRef;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/* ===================== Shared Log ===================== */

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Counter bumped by a completion callback
pub fn completion_counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let bump = count.clone();
    (count, move || {
        bump.fetch_add(1, Ordering::SeqCst);
    })
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/* ===================== Recording Bus ===================== */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    End,
    Execute { index: usize, name: String, total: usize },
}

#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Indices reported through `on_command_execute`, in order
    pub fn executed(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Execute { index, .. } => Some(index),
                _ => None,
            })
            .collect()
    }
}

impl SignalBus for Recorder {
    fn on_sequence_start(&self, _engine: &EngineRef) {
        self.events.lock().unwrap().push(Event::Start);
    }

    fn on_sequence_end(&self, _engine: &EngineRef) {
        self.events.lock().unwrap().push(Event::End);
    }

    fn on_command_execute(
        &self,
        _engine: &EngineRef,
        command: &dyn Command,
        index: usize,
        total: usize,
    ) {
        self.events.lock().unwrap().push(Event::Execute {
            index,
            name: command.name().to_string(),
            total,
        });
    }
}

/* ===================== Probe Command ===================== */

/// Slot a holding probe parks its continuation in
pub type Handle = Arc<Mutex<Option<Continuation>>>;

pub fn new_handle() -> Handle {
    Arc::new(Mutex::new(None))
}

pub fn release(handle: &Handle) -> bool {
    handle
        .lock()
        .unwrap()
        .as_ref()
        .map_or(false, |continuation| continuation.resume())
}

#[derive(Debug, Clone)]
pub enum Mode {
    /// Complete immediately
    Sync,
    /// Complete by jumping to its own index + 1
    JumpNext,
    /// Park a continuation and wait for the test to release it
    Hold(Handle),
    /// Return an error from `execute`
    Fail(&'static str),
    /// Ask the engine to restart at the given index, once
    RestartOnce { at: usize, fired: bool },
}

/// Scriptable command that logs its name whenever it executes
pub struct Probe {
    name: String,
    log: Log,
    mode: Mode,
    open: bool,
    close: bool,
    stops: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new(name: &str, log: &Log, mode: Mode) -> Self {
        Probe {
            name: name.to_string(),
            log: log.clone(),
            mode,
            open: false,
            close: false,
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sync(name: &str, log: &Log) -> Self {
        Self::new(name, log, Mode::Sync)
    }

    pub fn hold(name: &str, log: &Log, handle: &Handle) -> Self {
        Self::new(name, log, Mode::Hold(handle.clone()))
    }

    pub fn opens(mut self) -> Self {
        self.open = true;
        self
    }

    pub fn closes(mut self) -> Self {
        self.close = true;
        self
    }

    /// Share the counter of `on_stop_executing` calls
    pub fn counting_stops(mut self, stops: &Arc<AtomicUsize>) -> Self {
        self.stops = stops.clone();
        self
    }
}

impl Command for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open_block(&self) -> bool {
        self.open
    }

    fn is_close_block(&self) -> bool {
        self.close
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        self.log.lock().unwrap().push(self.name.clone());
        match &mut self.mode {
            Mode::Sync => {
                ctx.continue_next();
            }
            Mode::JumpNext => {
                ctx.jump_to(ctx.index() + 1);
            }
            Mode::Hold(handle) => {
                *handle.lock().unwrap() = Some(ctx.continuation());
            }
            Mode::Fail(message) => return Err(CommandError::failed(*message)),
            Mode::RestartOnce { at, fired } => {
                if *fired {
                    ctx.continue_next();
                } else {
                    *fired = true;
                    ctx.restart_at(*at);
                }
            }
        }
        Ok(())
    }

    fn on_stop_executing(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/* ===================== Builders ===================== */

pub fn boxed(command: impl Command + 'static) -> Box<dyn Command> {
    Box::new(command)
}

/// Engine over `commands` with a recording bus attached
pub fn engine_with(commands: Vec<Box<dyn Command>>) -> (ExecutionEngine, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let engine = ExecutionEngine::new("test", CommandSequence::from_commands(commands))
        .with_signal_bus(recorder.clone());
    (engine, recorder)
}
