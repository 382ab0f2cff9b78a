//! CLI error types

use jals_engine::AmplifyError;
use jals_layers::LayerError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Engine error: {0}")]
    Engine(#[from] AmplifyError),

    #[error("Layer error: {0}")]
    Layer(#[from] LayerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
