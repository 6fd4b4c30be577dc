//! Structural and scheduling commands that belong to the engine itself
//!
//! Game-facing commands (dialogue, flags, audio...) live in the host; these
//! only cover jump targets, blocks, waiting and stopping.

use super::{Command, CommandKind, ExecContext};
use crate::errors::CommandError;
use tracing::warn;

/* ===================== Label / Comment ===================== */

/// Named jump target
#[derive(Debug, Clone)]
pub struct Label {
    key: String,
}

impl Label {
    pub fn new(key: impl Into<String>) -> Self {
        Label { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Command for Label {
    fn name(&self) -> &str {
        "Label"
    }

    fn kind(&self) -> CommandKind<'_> {
        CommandKind::Label(&self.key)
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        ctx.continue_next();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment { text: text.into() }
    }
}

impl Command for Comment {
    fn name(&self) -> &str {
        "Comment"
    }

    fn kind(&self) -> CommandKind<'_> {
        CommandKind::Comment
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        ctx.continue_next();
        Ok(())
    }
}

/* ===================== Goto ===================== */

/// Jump to a label. An unknown label is an authoring mistake: it is logged
/// and the run continues with the next command.
#[derive(Debug, Clone)]
pub struct Goto {
    label: String,
}

impl Goto {
    pub fn new(label: impl Into<String>) -> Self {
        Goto {
            label: label.into(),
        }
    }
}

impl Command for Goto {
    fn name(&self) -> &str {
        "Goto"
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        match ctx.find_label(&self.label) {
            Some(target) => ctx.jump_to(target),
            None => {
                warn!(label = %self.label, index = ctx.index(), "label not found");
                ctx.continue_next()
            }
        };
        Ok(())
    }
}

/* ===================== Wait ===================== */

/// Suspend the run for a number of host ticks
#[derive(Debug, Clone)]
pub struct Wait {
    ticks: u32,
    remaining: u32,
}

impl Wait {
    pub fn ticks(ticks: u32) -> Self {
        Wait {
            ticks,
            remaining: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Command for Wait {
    fn name(&self) -> &str {
        "Wait"
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        self.remaining = self.ticks;
        if self.remaining == 0 {
            ctx.continue_next();
        }
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            ctx.continue_next();
        }
        Ok(())
    }

    fn on_stop_executing(&mut self) {
        self.remaining = 0;
    }
}

/* ===================== If / End ===================== */

type Condition = Box<dyn FnMut() -> bool + Send>;

/// Conditional block opener.
///
/// When the condition is false the run resumes after the matching `End`,
/// or at the end of the sequence if the block is never closed.
pub struct If {
    condition: Condition,
}

impl If {
    pub fn new(condition: impl FnMut() -> bool + Send + 'static) -> Self {
        If {
            condition: Box::new(condition),
        }
    }
}

impl Command for If {
    fn name(&self) -> &str {
        "If"
    }

    fn is_open_block(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        if (self.condition)() {
            ctx.continue_next();
        } else {
            let target = ctx.find_block_end().map_or(ctx.total(), |end| end + 1);
            ctx.jump_to(target);
        }
        Ok(())
    }
}

/// Closes the innermost open block
#[derive(Debug, Clone, Default)]
pub struct End;

impl Command for End {
    fn name(&self) -> &str {
        "End"
    }

    fn is_close_block(&self) -> bool {
        true
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        ctx.continue_next();
        Ok(())
    }
}

/* ===================== StopSequence ===================== */

/// Stops the engine that runs it
#[derive(Debug, Clone, Default)]
pub struct StopSequence;

impl Command for StopSequence {
    fn name(&self) -> &str {
        "Stop"
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        ctx.stop_engine();
        Ok(())
    }
}
