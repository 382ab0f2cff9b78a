//! Engine state snapshots: the last forward step and the persisted document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::history::HistoryEntry;
use crate::layer::LayerId;
use crate::record::Record;

/// Snapshot of the most recent forward amplification.
///
/// Only forward single steps overwrite this slot; reverse steps leave it
/// untouched. Quality scoring reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    pub source_layer: LayerId,
    pub target_layer: LayerId,
    pub input_data: Record,
    pub output_data: Record,
}

/// The document written by `save_state` and read by `load_state`.
///
/// Transformer instances are never part of it, only the configurations
/// they declare. Missing top-level keys read as their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub config: EngineConfig,
    pub history: Vec<HistoryEntry>,
    pub current_state: Option<CurrentState>,
    pub transformer_configs: BTreeMap<String, Record>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_loads_as_default() {
        let state: PersistedState = serde_json::from_value(json!({})).unwrap();
        assert_eq!(state, PersistedState::default());
        assert!(state.current_state.is_none());
    }

    #[test]
    fn top_level_keys_are_present() {
        let value = serde_json::to_value(PersistedState::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in ["config", "history", "current_state", "transformer_configs"] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert!(object["current_state"].is_null());
    }

    #[test]
    fn current_state_field_names() {
        let state = CurrentState {
            source_layer: LayerId::from_name("layer1"),
            target_layer: LayerId::from_name("layer2"),
            input_data: Record::new(),
            output_data: Record::new(),
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["source_layer"], json!("layer1"));
        assert_eq!(value["target_layer"], json!("layer2"));
        assert!(value["input_data"].is_object());
        assert!(value["output_data"].is_object());
    }
}
