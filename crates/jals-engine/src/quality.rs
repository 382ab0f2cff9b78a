//! Pluggable quality scoring for the last forward amplification.
//!
//! The engine only owns the aggregation contract (four scores and their
//! mean). How the four scores are produced is up to the scorer; the
//! default `FixedQualityScorer` reports constant values.

use jals_types::{CurrentState, QualityComponents};

/// Default fidelity reported by `FixedQualityScorer`.
pub const DEFAULT_FIDELITY: f64 = 0.85;
/// Default coherence reported by `FixedQualityScorer`.
pub const DEFAULT_COHERENCE: f64 = 0.90;
/// Default completeness reported by `FixedQualityScorer`.
pub const DEFAULT_COMPLETENESS: f64 = 0.88;
/// Default efficiency reported by `FixedQualityScorer`.
pub const DEFAULT_EFFICIENCY: f64 = 0.92;

/// Trait for scoring a completed forward amplification.
pub trait QualityScorer: Send + Sync {
    /// Score the given snapshot. Values outside `[0, 1]` are clamped by
    /// the engine.
    fn score(&self, state: &CurrentState) -> QualityComponents;

    /// Name of this scorer implementation.
    fn name(&self) -> &str;
}

/// Scorer returning the same four values for every snapshot.
pub struct FixedQualityScorer {
    components: QualityComponents,
}

impl FixedQualityScorer {
    pub fn new() -> Self {
        Self::with_components(QualityComponents {
            fidelity: DEFAULT_FIDELITY,
            coherence: DEFAULT_COHERENCE,
            completeness: DEFAULT_COMPLETENESS,
            efficiency: DEFAULT_EFFICIENCY,
        })
    }

    pub fn with_components(components: QualityComponents) -> Self {
        Self { components }
    }
}

impl Default for FixedQualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityScorer for FixedQualityScorer {
    fn score(&self, _state: &CurrentState) -> QualityComponents {
        self.components
    }

    fn name(&self) -> &str {
        "fixed-quality-scorer"
    }
}
