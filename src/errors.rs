//! Error types for the sequence engine
//!
//! Library errors are `thiserror` enums. Command authors may return either a
//! plain message or any `anyhow::Error` from their hooks.

use crate::types::Location;
use thiserror::Error;

/* ===================== Command Errors ===================== */

/// Error raised by a command's `execute` or `on_tick` hook
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command failed with a message
    #[error("{0}")]
    Failed(String),

    /// Any other error surfaced by the command implementation
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CommandError {
    pub fn failed(message: impl Into<String>) -> Self {
        CommandError::Failed(message.into())
    }
}

/* ===================== Engine Errors ===================== */

/// Errors returned by `ExecutionEngine` operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// A command faulted while running. The engine is left executing with the
    /// faulting command active until `stop()` is called.
    #[error("command failed at {location}")]
    CommandFailed {
        location: Location,
        #[source]
        source: CommandError,
    },

    /// Structural access was requested while a run is in flight
    #[error("sequence '{engine}' is executing; structural edits must wait until it is idle")]
    Busy { engine: String },

    /// An index outside the sequence was supplied
    #[error("index {index} is out of range for a sequence of {len} commands")]
    IndexOutOfRange { index: usize, len: usize },

    /// The operation requires a run in flight
    #[error("sequence '{engine}' is not executing")]
    NotExecuting { engine: String },
}

/* ===================== Config Errors ===================== */

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}
