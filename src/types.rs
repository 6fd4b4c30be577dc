//! Shared engine types
//!
//! Identity, run state, the pending-jump register value and the
//! serializable views handed to observers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/* ===================== Identity ===================== */

/// Identifier of one engine instance, stamped onto every command it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineId(Uuid);

impl EngineId {
    pub fn new() -> Self {
        EngineId(Uuid::new_v4())
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lightweight reference to an engine, passed to signal observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRef {
    pub id: EngineId,
    pub name: String,
}

/* ===================== Run State ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Executing,
}

/// Value held by the pending-jump register
///
/// `Abort` sits past the end of every sequence, so the run loop exits on
/// its next check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    To(usize),
    Abort,
}

impl Jump {
    /// Cursor position this jump resolves to
    pub fn target(self) -> usize {
        match self {
            Jump::To(index) => index,
            Jump::Abort => usize::MAX,
        }
    }
}

/// Result of asking an engine to start a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// The run started (it may already have completed if every command was synchronous)
    Started,
    /// The engine was already executing; the request was dropped
    Rejected,
    /// The requested label does not exist in the sequence
    LabelNotFound,
}

/* ===================== Diagnostics ===================== */

/// Location of a command, used only in diagnostic messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub engine: String,
    pub index: usize,
    pub command: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.engine, self.index, self.command)
    }
}

/// Serializable view of an engine, for observers such as UI highlighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub id: EngineId,
    pub name: String,
    pub state: EngineState,
    pub active: Option<usize>,
    pub previous_active_index: Option<usize>,
    pub run_count: u64,
    pub total: usize,
}
