//! Operation patterns mined from history and handed to optimization hooks.

use serde::{Deserialize, Serialize};

/// Kind of pattern detected in the operation history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// How often an operation appears.
    Frequency,
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frequency => write!(f, "frequency"),
        }
    }
}

/// A pattern over one operation name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPattern {
    pub operation: String,
    pub frequency: usize,
    pub pattern_type: PatternType,
}

impl OperationPattern {
    /// A frequency pattern for `operation` seen `count` times.
    pub fn frequency(operation: impl Into<String>, count: usize) -> Self {
        Self {
            operation: operation.into(),
            frequency: count,
            pattern_type: PatternType::Frequency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_shape() {
        let value = serde_json::to_value(OperationPattern::frequency("amplify", 3)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"operation": "amplify", "frequency": 3, "pattern_type": "frequency"})
        );
    }
}
