//! Stage configuration, optionally read from a YAML file.

use std::path::Path;

use jals_types::{into_record, Record};
use serde::{Deserialize, Serialize};

use crate::error::LayerResult;
use crate::layer4::DeploymentTarget;

/// Shared configuration for the layer stages.
///
/// Missing keys fall back to their defaults, so an empty YAML document is
/// a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// First-to-last point distance below which a stroke counts as a loop.
    pub closure_tolerance: f64,
    /// Relationships at or below this strength are dropped by layer 2.
    pub relationship_threshold: f64,
    /// Targets layer 4 produces deployment descriptors for.
    pub deployment_targets: Vec<DeploymentTarget>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            closure_tolerance: 0.1,
            relationship_threshold: 0.3,
            deployment_targets: DeploymentTarget::ALL.to_vec(),
        }
    }
}

impl StageConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> LayerResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file.
    pub fn load(path: impl AsRef<Path>) -> LayerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// The configuration as a record, as exposed by stage transformers.
    pub fn to_record(&self) -> Record {
        serde_json::to_value(self)
            .map(into_record)
            .unwrap_or_default()
    }
}
