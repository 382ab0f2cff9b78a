//! Amplification engine error types.
//!
//! `TransformError` is what transformers raise; the engine carries it
//! through `AmplifyError::Transformer` without rewording it.

use jals_types::TransformerKey;
use thiserror::Error;

/// Errors raised inside a transformer's `transform` or `optimize` hook.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The input record does not have the shape the transformer expects.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A field the transformer requires is absent.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The transformation itself failed.
    #[error("Transformation failed: {0}")]
    Failed(String),

    /// The optimization hook failed.
    #[error("Optimization failed: {0}")]
    OptimizationFailed(String),
}

/// Result type for transformer hooks.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur in the amplification engine.
#[derive(Debug, Error)]
pub enum AmplifyError {
    /// No transformer is registered under the derived key.
    #[error("Transformer {0} not found")]
    NotFound(TransformerKey),

    /// A transformer hook failed; the error passes through unchanged.
    #[error(transparent)]
    Transformer(#[from] TransformError),

    /// An operation needed a completed forward step and none exists.
    #[error("Missing state: {0}")]
    MissingState(String),

    /// Reading or writing a state file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A state document could not be encoded or decoded.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// A shared engine lock was poisoned by a panicking holder.
    #[error("Engine lock poisoned")]
    Lock,
}

/// Coarse classification of engine errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TransformerFailure,
    MissingState,
    PersistenceFailure,
    Lock,
}

impl AmplifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Transformer(_) => ErrorKind::TransformerFailure,
            Self::MissingState(_) => ErrorKind::MissingState,
            Self::Io(_) | Self::Serialization(_) => ErrorKind::PersistenceFailure,
            Self::Lock => ErrorKind::Lock,
        }
    }
}

/// Result type for engine operations.
pub type AmplifyResult<T> = Result<T, AmplifyError>;
