//! Append-only operation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Record;

// ── Operation Kind ───────────────────────────────────────────────────

/// Operations the engine records in its history.
///
/// Saving and loading state are not recorded, so a saved history reads
/// back equal to the one written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    RegisterTransformer,
    Amplify,
    ReverseAmplify,
    OptimizeTransformations,
}

impl OperationKind {
    /// The operation name as written into history entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterTransformer => "register_transformer",
            Self::Amplify => "amplify",
            Self::ReverseAmplify => "reverse_amplify",
            Self::OptimizeTransformations => "optimize_transformations",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── History Entry ────────────────────────────────────────────────────

/// One logged operation.
///
/// `operation` is kept as a string so that histories loaded from disk
/// may carry operation names this build does not know about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub operation: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub params: Record,
}

impl HistoryEntry {
    /// Stamp a new entry with the current time.
    pub fn new(kind: OperationKind, params: Record) -> Self {
        Self {
            operation: kind.as_str().to_string(),
            timestamp: Utc::now(),
            params,
        }
    }

    pub fn is(&self, kind: OperationKind) -> bool {
        self.operation == kind.as_str()
    }
}

/// Timestamps serialize as RFC 3339 strings with full sub-second precision.
///
/// Deserialization also accepts naive `YYYY-MM-DDTHH:MM:SS[.f]` strings,
/// which are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operation_names() {
        assert_eq!(OperationKind::RegisterTransformer.to_string(), "register_transformer");
        assert_eq!(OperationKind::Amplify.to_string(), "amplify");
        assert_eq!(OperationKind::ReverseAmplify.to_string(), "reverse_amplify");
        assert_eq!(
            OperationKind::OptimizeTransformations.to_string(),
            "optimize_transformations"
        );
    }

    #[test]
    fn entry_roundtrip_is_exact() {
        let mut params = Record::new();
        params.insert("name".into(), json!("layer1_to_layer2"));
        let entry = HistoryEntry::new(OperationKind::RegisterTransformer, params);

        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert!(back.is(OperationKind::RegisterTransformer));
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "operation": "amplify",
            "timestamp": "2024-03-01T12:30:00",
            "params": {}
        }))
        .unwrap();
        assert_eq!(entry.timestamp.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn missing_params_default_to_empty() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "operation": "custom_step",
            "timestamp": "2024-03-01T12:30:00Z"
        }))
        .unwrap();
        assert!(entry.params.is_empty());
        assert!(!entry.is(OperationKind::Amplify));
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let result: Result<HistoryEntry, _> = serde_json::from_value(json!({
            "operation": "amplify",
            "timestamp": "yesterday"
        }));
        assert!(result.is_err());
    }
}
