//! Engine inspection commands: quality, history, optimization, state

use crate::commands::Session;
use crate::error::CliResult;
use crate::output::{print_heading, print_rows, print_success, KeyValueRow};
use clap::Subcommand;
use jals_types::{HistoryEntry, OperationPattern};
use std::path::PathBuf;
use tabled::Tabled;

/// State subcommands
#[derive(Subcommand)]
pub enum StateCommands {
    /// Show the persisted-state document
    Show,

    /// Write the state document to a file
    Export {
        /// Destination path
        path: PathBuf,
    },

    /// List transformer configurations read from the last loaded state
    Configs,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Params")]
    params: String,
}

#[derive(Tabled)]
struct PatternRow {
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Frequency")]
    frequency: usize,
    #[tabled(rename = "Type")]
    pattern_type: String,
}

/// Report quality of the last forward amplification
pub fn quality(session: &Session) -> CliResult<()> {
    let quality = session.engine.get_transformation_quality();
    let rows: Vec<KeyValueRow> = quality
        .to_record()
        .iter()
        .map(|(k, v)| KeyValueRow::new(k.as_str(), v))
        .collect();

    print_heading("Transformation Quality", session.format);
    print_rows(&quality, rows, session.format)
}

/// Show the operation history, newest last
pub fn history(session: &Session, limit: Option<usize>) -> CliResult<()> {
    let entries = session.engine.history();
    let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
    let shown: &[HistoryEntry] = &entries[skip..];

    let rows: Vec<HistoryRow> = shown
        .iter()
        .enumerate()
        .map(|(i, entry)| HistoryRow {
            index: skip + i,
            operation: entry.operation.clone(),
            timestamp: entry.timestamp.to_rfc3339(),
            params: serde_json::Value::Object(entry.params.clone()).to_string(),
        })
        .collect();

    print_heading("Operation History", session.format);
    print_rows(&shown, rows, session.format)
}

/// Mine history patterns and hand them to every transformer
pub fn optimize(session: &mut Session) -> CliResult<()> {
    let patterns: Vec<OperationPattern> = session.engine.optimize_transformations()?;
    let rows: Vec<PatternRow> = patterns
        .iter()
        .map(|p| PatternRow {
            operation: p.operation.clone(),
            frequency: p.frequency,
            pattern_type: p.pattern_type.to_string(),
        })
        .collect();

    print_heading("Operation Patterns", session.format);
    print_rows(&patterns, rows, session.format)?;
    print_success(&format!(
        "Optimized {} transformers using {} patterns",
        session.engine.registry().len(),
        patterns.len()
    ));
    Ok(())
}

/// Execute state command
pub fn state(session: &Session, command: StateCommands) -> CliResult<()> {
    match command {
        StateCommands::Show => show_state(session),
        StateCommands::Export { path } => {
            session.engine.save_state(&path)?;
            print_success(&format!("State written to {}", path.display()));
            Ok(())
        }
        StateCommands::Configs => {
            let configs = session.engine.restored_transformer_configs();
            let rows: Vec<KeyValueRow> = configs
                .iter()
                .map(|(name, config)| {
                    KeyValueRow::new(name.as_str(), serde_json::Value::Object(config.clone()))
                })
                .collect();

            print_heading("Restored Transformer Configs", session.format);
            print_rows(configs, rows, session.format)
        }
    }
}

fn show_state(session: &Session) -> CliResult<()> {
    let snapshot = session.engine.snapshot();
    let current = snapshot
        .current_state
        .as_ref()
        .map(|s| format!("{} → {}", s.source_layer.as_str(), s.target_layer.as_str()))
        .unwrap_or_else(|| "none".to_string());

    let rows = vec![
        KeyValueRow::new("engine", &snapshot.config.name),
        KeyValueRow::new("atomic_writes", snapshot.config.atomic_writes),
        KeyValueRow::new("history_entries", snapshot.history.len()),
        KeyValueRow::new("current_state", current),
        KeyValueRow::new("transformers", session.engine.registry().names().join(", ")),
        KeyValueRow::new("quality_scorer", session.engine.scorer_name()),
    ];

    print_heading("Engine State", session.format);
    print_rows(&snapshot, rows, session.format)
}
