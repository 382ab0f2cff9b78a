//! Layer stage commands

use crate::commands::{read_record, Session};
use crate::error::CliResult;
use crate::output::{print_heading, print_rows, print_single, print_success};
use clap::Subcommand;
use jals_layers::{CoreIdeogram, ManuscriptEncoder, SourceKind};
use jals_types::{Record, TransformerKey, PIPELINE_LAYERS};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::Tabled;

/// Layer subcommands
#[derive(Subcommand)]
pub enum LayersCommands {
    /// Show the pipeline layers and the transformer serving each step
    List,

    /// Encode a raw manuscript into layer 1 features
    Encode {
        /// Manuscript file, device name, or stream endpoint
        source: String,

        /// Kind of source (file, device, stream)
        #[arg(short, long, default_value = "file")]
        kind: SourceKind,

        /// Write the encoding to a file instead of printing it
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Encode a manuscript and amplify it through every layer
    Run {
        /// Manuscript JSON file (`-` reads stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Build a core ideogram and print its computational tokens
    Ideogram {
        /// Manuscript JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Save the ideogram data to a file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Serialize, Tabled)]
struct StepRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Transformer")]
    transformer: String,
}

/// Execute layers command
pub fn execute(session: &mut Session, command: LayersCommands) -> CliResult<()> {
    match command {
        LayersCommands::List => list(session),
        LayersCommands::Encode { source, kind, save } => {
            encode(session, &source, kind, save.as_deref())
        }
        LayersCommands::Run { input } => run(session, &input),
        LayersCommands::Ideogram { input, save } => ideogram(session, &input, save.as_deref()),
    }
}

fn list(session: &Session) -> CliResult<()> {
    let registry = session.engine.registry();
    let rows: Vec<StepRow> = PIPELINE_LAYERS
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let key = TransformerKey::forward(pair[0], pair[1]).name();
            let transformer = registry
                .get(&key)
                .map(|t| t.name().to_string())
                .unwrap_or_else(|| "-".to_string());
            StepRow {
                step: i + 1,
                key,
                transformer,
            }
        })
        .collect();

    let data = serde_json::to_value(&rows)?;
    print_heading("Layer Pipeline", session.format);
    print_rows(&data, rows, session.format)
}

fn encode(
    session: &Session,
    source: &str,
    kind: SourceKind,
    save: Option<&Path>,
) -> CliResult<()> {
    let mut encoder = ManuscriptEncoder::new(session.stages.clone());
    encoder.capture(source, kind)?;
    encoder.preprocess(None)?;
    encoder.extract_features(None)?;
    let encoded = encoder.encode(None)?;

    match save {
        Some(path) => write_record(&encoded, path),
        None => {
            print_heading("Manuscript Encoding", session.format);
            print_single(&encoded, session.format)
        }
    }
}

fn run(session: &mut Session, input: &Path) -> CliResult<()> {
    let manuscript = read_record(input)?;
    let mut encoder = ManuscriptEncoder::new(session.stages.clone());
    let encoded = encoder.encode_manuscript(&manuscript)?;
    let output = session.engine.multi_layer_amplify(&encoded, &PIPELINE_LAYERS)?;

    print_heading(&PIPELINE_LAYERS.join(" → "), session.format);
    print_single(&output, session.format)
}

fn ideogram(session: &Session, input: &Path, save: Option<&Path>) -> CliResult<()> {
    let mut ideogram = CoreIdeogram::new();
    ideogram.load_manuscript_file(input)?;
    let features = ideogram.extract_features()?;
    ideogram.generate_symbolic_representation(&features);
    let computational = ideogram.to_computational_representation()?;

    if let Some(path) = save {
        ideogram.save(path)?;
        print_success(&format!("{} saved to {}", ideogram.id(), path.display()));
    }

    print_heading(&ideogram.id().to_string(), session.format);
    print_single(&computational, session.format)
}

fn write_record(record: &Record, path: &Path) -> CliResult<()> {
    std::fs::write(path, serde_json::to_string_pretty(record)?)?;
    print_success(&format!("Encoding written to {}", path.display()));
    Ok(())
}
