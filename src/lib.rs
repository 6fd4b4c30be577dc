pub mod command;
pub mod config;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod sequence;
pub mod signals;
pub mod types;

// Re-export main types
pub use command::{Command, CommandKind, ExecContext};
pub use engine::{CompletionCallback, Continuation, ExecutionEngine};
pub use errors::{CommandError, EngineError};
pub use sequence::CommandSequence;
pub use signals::{SignalBus, TracingSignalBus};
pub use types::*;
