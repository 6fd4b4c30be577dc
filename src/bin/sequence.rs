//! Demo host for the sequence engine
//!
//! Builds a small scene in code and drives it on a tokio interval, logging
//! every lifecycle notification.
//!
//! ```bash
//! sequence run --label choice --json
//! sequence config
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sequence_core::command::{Comment, End, Goto, If, Label, Wait};
use sequence_core::config::{Config, ConfigLoader};
use sequence_core::driver::run_until_idle;
use sequence_core::{
    Command, CommandError, CommandSequence, ExecContext, ExecutionEngine, Launch, TracingSignalBus,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sequence")]
#[command(about = "Run a demo command sequence", long_about = None)]
struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the demo scene until it finishes
    Run {
        /// Start at this label instead of the first command
        #[arg(short = 'l', long = "label")]
        label: Option<String>,

        /// Take the branch guarded by the demo condition
        #[arg(long)]
        brave: bool,

        /// Print the final engine snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Demo stand-in for a dialogue command: logs its line and continues
struct Say {
    line: String,
}

impl Say {
    fn new(line: &str) -> Self {
        Say {
            line: line.to_string(),
        }
    }
}

impl Command for Say {
    fn name(&self) -> &str {
        "Say"
    }

    fn execute(&mut self, ctx: &mut ExecContext<'_>) -> Result<(), CommandError> {
        info!(index = ctx.index(), indent = ctx.indent_level(), "{}", self.line);
        ctx.continue_next();
        Ok(())
    }
}

fn demo_scene(brave: bool) -> CommandSequence {
    CommandSequence::new()
        .then(Comment::new("opening"))
        .then(Say::new("The lantern flickers."))
        .then(Wait::ticks(2))
        .then(Label::new("choice"))
        .then(If::new(move || brave))
        .then(Say::new("You step into the dark."))
        .then(Goto::new("ending"))
        .then(End)
        .then(Say::new("You wait for morning."))
        .then(Wait::ticks(3))
        .then(Label::new("ending"))
        .then(Say::new("The End."))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().file(path),
        None => ConfigLoader::new(),
    };
    let config: Config = loader.load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { label, brave, json } => {
            let mut engine = ExecutionEngine::new("demo", demo_scene(brave))
                .with_config(config.engine.clone())
                .with_signal_bus(Arc::new(TracingSignalBus));

            let launch = match &label {
                Some(key) => engine.execute_label(key, None)?,
                None => engine.execute(0)?,
            };
            if launch == Launch::LabelNotFound {
                bail!("no label named '{}' in the demo scene", label.unwrap_or_default());
            }

            let outcome = run_until_idle(&mut engine, &config.driver).await?;
            info!(ticks = outcome.ticks, completed = outcome.completed, "demo finished");

            if json {
                println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
