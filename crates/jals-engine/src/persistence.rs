//! Engine state persistence.
//!
//! Provides the `StatePersistence` trait, a `JsonFileState` backend that
//! writes the state document as indented JSON, and an `InMemoryState`
//! backend for tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jals_types::PersistedState;
use tracing::info;

use crate::error::{AmplifyError, AmplifyResult};

/// Trait for storing and retrieving the engine state document.
pub trait StatePersistence {
    /// Save the full state document.
    fn save(&self, state: &PersistedState) -> AmplifyResult<()>;

    /// Load the full state document.
    fn load(&self) -> AmplifyResult<PersistedState>;
}

/// JSON-file based state persistence.
///
/// With atomic writes enabled the document is written to a `.tmp`
/// sibling and renamed over the target.
pub struct JsonFileState {
    path: PathBuf,
    atomic: bool,
}

impl JsonFileState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic: true,
        }
    }

    pub fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatePersistence for JsonFileState {
    fn save(&self, state: &PersistedState) -> AmplifyResult<()> {
        let json = serde_json::to_string_pretty(state)?;

        if self.atomic {
            let tmp_path = self.path.with_extension("tmp");
            std::fs::write(&tmp_path, json)?;
            std::fs::rename(&tmp_path, &self.path)?;
        } else {
            std::fs::write(&self.path, json)?;
        }

        info!(
            path = %self.path.display(),
            history = state.history.len(),
            transformers = state.transformer_configs.len(),
            "engine state saved"
        );
        Ok(())
    }

    fn load(&self) -> AmplifyResult<PersistedState> {
        let contents = std::fs::read_to_string(&self.path)?;
        let state: PersistedState = serde_json::from_str(&contents)?;

        info!(
            path = %self.path.display(),
            history = state.history.len(),
            "engine state loaded"
        );
        Ok(state)
    }
}

/// In-memory state persistence (for testing).
#[derive(Default)]
pub struct InMemoryState {
    data: Mutex<Option<PersistedState>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatePersistence for InMemoryState {
    fn save(&self, state: &PersistedState) -> AmplifyResult<()> {
        let mut data = self.data.lock().map_err(|_| AmplifyError::Lock)?;
        *data = Some(state.clone());
        Ok(())
    }

    fn load(&self) -> AmplifyResult<PersistedState> {
        let data = self.data.lock().map_err(|_| AmplifyError::Lock)?;
        data.clone()
            .ok_or_else(|| AmplifyError::MissingState("no state has been saved".into()))
    }
}
