//! Async host loop
//!
//! Pumps `ExecutionEngine::tick()` on a tokio interval until the engine
//! returns to idle. Games with their own frame loop call `tick()` directly
//! instead.

use crate::config::DriverConfig;
use crate::engine::ExecutionEngine;
use crate::errors::EngineError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// How a driven run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveOutcome {
    pub ticks: u64,
    /// False when the tick budget ran out with the engine still executing
    pub completed: bool,
}

/// Tick `engine` until it is idle or `config.max_ticks` is reached.
///
/// Hitting the budget, or finding the engine faulted, leaves the run in
/// place; stopping it is the caller's decision.
pub async fn run_until_idle(
    engine: &mut ExecutionEngine,
    config: &DriverConfig,
) -> Result<DriveOutcome, EngineError> {
    let mut timer = interval(config.tick_interval());
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick of a tokio interval completes immediately
    timer.tick().await;

    let mut ticks = 0;
    while engine.is_executing() {
        // faulted runs ignore ticks; only stop() or redirect() moves them
        if engine.is_faulted() {
            warn!(engine = engine.name(), ticks, "engine is faulted; driver giving up");
            return Ok(DriveOutcome {
                ticks,
                completed: false,
            });
        }
        if config.max_ticks.is_some_and(|max| ticks >= max) {
            warn!(engine = engine.name(), ticks, "tick budget exhausted; run still executing");
            return Ok(DriveOutcome {
                ticks,
                completed: false,
            });
        }
        timer.tick().await;
        engine.tick()?;
        ticks += 1;
    }

    debug!(engine = engine.name(), ticks, "driver finished");
    Ok(DriveOutcome {
        ticks,
        completed: true,
    })
}
