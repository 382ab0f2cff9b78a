//! Layer stage error types.

use jals_engine::TransformError;
use thiserror::Error;

/// Errors that can occur in a layer stage.
#[derive(Debug, Error)]
pub enum LayerError {
    /// The capture source kind is not one of file, device, stream.
    #[error("Unsupported source type: {0}")]
    UnsupportedSource(String),

    /// A stage step was called with no argument and no earlier output.
    #[error("No {0} available")]
    MissingInput(&'static str),

    /// A record lacks a field the stage needs.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A field is present but malformed.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unsupported deployment target name.
    #[error("Unknown deployment target: {0}")]
    UnknownTarget(String),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or encode failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML stage configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for layer stage operations.
pub type LayerResult<T> = Result<T, LayerError>;

impl From<LayerError> for TransformError {
    fn from(err: LayerError) -> Self {
        match err {
            LayerError::MissingField(field) => TransformError::MissingField(field),
            LayerError::MissingInput(what) => TransformError::InvalidInput(format!("no {}", what)),
            LayerError::InvalidData(msg) => TransformError::InvalidInput(msg),
            other => TransformError::Failed(other.to_string()),
        }
    }
}
