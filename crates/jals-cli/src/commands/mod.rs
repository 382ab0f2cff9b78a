//! CLI commands

pub mod amplify;
pub mod inspect;
pub mod layers;

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use jals_engine::AmplificationEngine;
use jals_layers::StageConfig;
use jals_types::Record;
use std::io::Read;
use std::path::Path;

/// Everything a command needs: the engine, stage settings, and the
/// chosen output format.
pub struct Session {
    pub engine: AmplificationEngine,
    pub stages: StageConfig,
    pub format: OutputFormat,
}

/// Read a JSON object from `path`, or from stdin when `path` is `-`.
pub fn read_record(path: &Path) -> CliResult<Record> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };

    match serde_json::from_str(&contents)? {
        serde_json::Value::Object(record) => Ok(record),
        other => Err(CliError::InvalidArgument(format!(
            "input must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
