//! Engine configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;

/// Configuration owned by an amplification engine and persisted with its
/// state.
///
/// Unknown keys are kept in `extra`, so caller-defined settings survive a
/// save/load round trip unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Label used in log output.
    pub name: String,
    /// Write state files to a temporary path and rename into place.
    pub atomic_writes: bool,
    /// Caller-defined settings.
    #[serde(flatten)]
    pub extra: Record,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "amplification-engine".into(),
            atomic_writes: true,
            extra: Record::new(),
        }
    }
}

impl EngineConfig {
    /// Default configuration with a custom label.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from a free-form record.
    ///
    /// Known keys are typed; everything else lands in `extra`.
    pub fn from_record(record: Record) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(record))
    }

    /// Add a caller-defined setting.
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
