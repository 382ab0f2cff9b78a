//! JALS CLI - Command-line interface for the amplification engine
//!
//! This CLI provides a terminal interface to:
//! - Run single forward/reverse amplifications and multi-layer chains
//! - Encode manuscripts and drive them through the layer stages
//! - Inspect quality, history, and operation patterns
//! - Persist engine state between invocations (`--state`)

use clap::{Parser, Subcommand};
use jals_engine::AmplificationEngine;
use jals_layers::{register_pipeline, StageConfig};
use jals_types::EngineConfig;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{amplify, inspect, layers, Session};
pub use config::CliConfig;
pub use error::{CliError, CliResult};
pub use output::{print_error, OutputFormat};

/// JALS CLI application
#[derive(Parser)]
#[command(name = "jals")]
#[command(about = "JALS - Journey Amplified Language Systems CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "JALS_CONFIG")]
    config: Option<PathBuf>,

    /// Engine state file, loaded before the command if present and saved after
    #[arg(short, long, env = "JALS_STATE", global = true)]
    state: Option<PathBuf>,

    /// YAML stage configuration
    #[arg(long, env = "JALS_STAGES")]
    stages: Option<PathBuf>,

    /// Serve layer1→layer2→layer3 with the built-in transformers
    #[arg(long)]
    builtins: bool,

    /// Output format (table, json, yaml)
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Amplify a record from one layer to the next
    Amplify(amplify::StepArgs),

    /// Run the reverse transformer between two layers
    Reverse(amplify::StepArgs),

    /// Amplify through a sequence of layers
    Chain(amplify::ChainArgs),

    /// Show quality of the last forward amplification
    Quality,

    /// Show the operation history
    History {
        /// Show only the last N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Analyze history and tune transformers
    Optimize,

    /// Inspect or export engine state
    State {
        #[command(subcommand)]
        command: inspect::StateCommands,
    },

    /// Work with the layer stages
    Layers {
        #[command(subcommand)]
        command: layers::LayersCommands,
    },
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.output.or(config.default_output).unwrap_or_default();
    let state_path = cli.state.or(config.state_file);
    let stages = match cli.stages.or(config.stage_config) {
        Some(path) => StageConfig::load(&path)?,
        None => StageConfig::default(),
    };

    let engine_config = config
        .engine_name
        .map(EngineConfig::named)
        .unwrap_or_default();
    let mut session = Session {
        engine: build_engine(engine_config, &stages, cli.builtins),
        stages,
        format,
    };

    if let Some(path) = state_path.as_ref().filter(|p| p.exists()) {
        session.engine.load_state(path)?;
    }

    match cli.command {
        Commands::Amplify(args) => amplify::amplify(&mut session, args)?,
        Commands::Reverse(args) => amplify::reverse(&mut session, args)?,
        Commands::Chain(args) => amplify::chain(&mut session, args)?,
        Commands::Quality => inspect::quality(&session)?,
        Commands::History { limit } => inspect::history(&session, limit)?,
        Commands::Optimize => inspect::optimize(&mut session)?,
        Commands::State { command } => inspect::state(&session, command)?,
        Commands::Layers { command } => layers::execute(&mut session, command)?,
    }

    if let Some(path) = &state_path {
        session.engine.save_state(path)?;
    }
    Ok(())
}

/// Layer stages for every pipeline step; with `builtins`, the built-in
/// transformers take over the first two steps.
fn build_engine(config: EngineConfig, stages: &StageConfig, builtins: bool) -> AmplificationEngine {
    let mut engine = AmplificationEngine::new(config);
    register_pipeline(&mut engine, stages);
    if builtins {
        engine.register_transformer(
            jals_engine::StrokesToSymbols::NAME,
            Box::new(jals_engine::StrokesToSymbols::new()),
        );
        engine.register_transformer(
            jals_engine::SymbolsToLinguistic::NAME,
            Box::new(jals_engine::SymbolsToLinguistic::new()),
        );
    }
    debug!(transformers = engine.registry().len(), "engine ready");
    engine
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
