//! Lifecycle notifications
//!
//! Observers such as UI highlighting implement `SignalBus` and are injected
//! per engine. The engine only calls into the bus and never reads its state;
//! an engine without a bus is perfectly valid.

use crate::command::Command;
use crate::types::EngineRef;
use tracing::{debug, info};

pub trait SignalBus: Send + Sync {
    fn on_sequence_start(&self, engine: &EngineRef);

    fn on_sequence_end(&self, engine: &EngineRef);

    /// Fired before the command's `execute()` is called
    fn on_command_execute(
        &self,
        engine: &EngineRef,
        command: &dyn Command,
        index: usize,
        total: usize,
    );
}

/// Bus that reports every notification through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSignalBus;

impl SignalBus for TracingSignalBus {
    fn on_sequence_start(&self, engine: &EngineRef) {
        info!(engine = %engine.name, id = %engine.id, "sequence started");
    }

    fn on_sequence_end(&self, engine: &EngineRef) {
        info!(engine = %engine.name, id = %engine.id, "sequence ended");
    }

    fn on_command_execute(
        &self,
        engine: &EngineRef,
        command: &dyn Command,
        index: usize,
        total: usize,
    ) {
        debug!(
            engine = %engine.name,
            command = command.name(),
            index,
            total,
            "executing command"
        );
    }
}
