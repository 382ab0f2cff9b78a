//! # jals-types
//!
//! Shared types for the JALS amplification pipeline: the open-ended
//! `Record` exchanged between stages, layer names and the composite
//! transformer keys derived from them, the append-only operation history,
//! the current-state snapshot, quality metrics, and the persisted engine
//! state document.
//!
//! ## Key Design Decisions
//!
//! - **Records are JSON objects**: `serde_json::Map<String, Value>` gives a
//!   structural tagged-union value without fixed schemas
//! - **Keys render to names**: `TransformerKey` displays as
//!   `{source}_to_{target}[_reverse]`, the exact registry name
//! - **Timestamps are strings on disk**: RFC 3339, full precision, so a
//!   saved history reloads equal to itself

#![deny(unsafe_code)]

pub mod config;
pub mod history;
pub mod layer;
pub mod pattern;
pub mod quality;
pub mod record;
pub mod state;

// ── Re-exports ───────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use history::{HistoryEntry, OperationKind};
pub use layer::{
    Direction, LayerId, TransformerKey, DEPLOYMENT_LAYER, LINGUISTIC_LAYER, MANUSCRIPT_LAYER,
    PIPELINE_LAYERS, SYMBOLIC_LAYER,
};
pub use pattern::{OperationPattern, PatternType};
pub use quality::{QualityComponents, QualityMetrics, TransformationQuality};
pub use record::{into_record, record_size, Record, RecordExt};
pub use state::{CurrentState, PersistedState};

/// Re-exported so downstream crates build records without naming serde_json.
pub use serde_json::Value;
