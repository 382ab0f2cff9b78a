//! Amplification commands: single steps and chains

use crate::commands::{read_record, Session};
use crate::error::CliResult;
use crate::output::{print_heading, print_single};
use clap::Args;
use std::path::PathBuf;

/// Arguments for a single forward or reverse step
#[derive(Args)]
pub struct StepArgs {
    /// Input JSON file (`-` reads stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Source layer
    #[arg(long)]
    pub from: String,

    /// Target layer
    #[arg(long)]
    pub to: String,
}

/// Arguments for a multi-layer chain
#[derive(Args)]
pub struct ChainArgs {
    /// Input JSON file (`-` reads stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Layers in order, comma-separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub layers: Vec<String>,

    /// Use the reverse transformers for every step
    #[arg(long)]
    pub reverse: bool,
}

/// Run one forward step
pub fn amplify(session: &mut Session, args: StepArgs) -> CliResult<()> {
    let input = read_record(&args.input)?;
    let output = session.engine.amplify(&input, args.from.as_str(), args.to.as_str())?;

    print_heading(&format!("{} → {}", args.from, args.to), session.format);
    print_single(&output, session.format)
}

/// Run one reverse step
pub fn reverse(session: &mut Session, args: StepArgs) -> CliResult<()> {
    let input = read_record(&args.input)?;
    let output = session
        .engine
        .reverse_amplify(&input, args.from.as_str(), args.to.as_str())?;

    print_heading(&format!("{} ← {}", args.to, args.from), session.format);
    print_single(&output, session.format)
}

/// Run a chain over consecutive layer pairs
pub fn chain(session: &mut Session, args: ChainArgs) -> CliResult<()> {
    let input = read_record(&args.input)?;
    let output = if args.reverse {
        session.engine.multi_layer_reverse_amplify(&input, &args.layers)?
    } else {
        session.engine.multi_layer_amplify(&input, &args.layers)?
    };

    let arrow = if args.reverse { " ← " } else { " → " };
    print_heading(&args.layers.join(arrow), session.format);
    print_single(&output, session.format)
}
