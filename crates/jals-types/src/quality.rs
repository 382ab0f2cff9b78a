//! Transformation quality metrics.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// The four raw quality scores produced by a scorer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityComponents {
    pub fidelity: f64,
    pub coherence: f64,
    pub completeness: f64,
    pub efficiency: f64,
}

impl QualityComponents {
    /// Clamp every score into `[0, 1]`. NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn unit(v: f64) -> f64 {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, 1.0)
            }
        }
        Self {
            fidelity: unit(self.fidelity),
            coherence: unit(self.coherence),
            completeness: unit(self.completeness),
            efficiency: unit(self.efficiency),
        }
    }

    /// Arithmetic mean of the four scores.
    pub fn mean(&self) -> f64 {
        (self.fidelity + self.coherence + self.completeness + self.efficiency) / 4.0
    }
}

/// The four scores plus their mean.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub fidelity: f64,
    pub coherence: f64,
    pub completeness: f64,
    pub efficiency: f64,
    pub overall_quality: f64,
}

impl QualityMetrics {
    pub fn from_components(components: QualityComponents) -> Self {
        let c = components.clamped();
        Self {
            fidelity: c.fidelity,
            coherence: c.coherence,
            completeness: c.completeness,
            efficiency: c.efficiency,
            overall_quality: c.mean(),
        }
    }
}

/// Result of a quality query.
///
/// Serializes either as `{"quality_score": 0.0}` when nothing has been
/// amplified yet, or as the five metric keys.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformationQuality {
    Scored(QualityMetrics),
    Unscored { quality_score: f64 },
}

impl TransformationQuality {
    /// The zero score reported before any forward amplification.
    pub fn unscored() -> Self {
        Self::Unscored { quality_score: 0.0 }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored(_))
    }

    pub fn metrics(&self) -> Option<&QualityMetrics> {
        match self {
            Self::Scored(m) => Some(m),
            Self::Unscored { .. } => None,
        }
    }

    /// Overall score: `overall_quality` when scored, else `quality_score`.
    pub fn overall(&self) -> f64 {
        match self {
            Self::Scored(m) => m.overall_quality,
            Self::Unscored { quality_score } => *quality_score,
        }
    }

    /// The result as a record keyed by metric name.
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Record::new(),
        }
    }
}

impl std::fmt::Display for TransformationQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scored(m) => write!(
                f,
                "Quality(overall={:.3}, fidelity={:.3}, coherence={:.3}, completeness={:.3}, efficiency={:.3})",
                m.overall_quality, m.fidelity, m.coherence, m.completeness, m.efficiency
            ),
            Self::Unscored { quality_score } => write!(f, "Quality(score={:.3})", quality_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unscored_has_single_key() {
        let record = TransformationQuality::unscored().to_record();
        assert_eq!(record.len(), 1);
        assert_eq!(record["quality_score"], serde_json::json!(0.0));
    }

    #[test]
    fn scored_has_five_keys() {
        let quality = TransformationQuality::Scored(QualityMetrics::from_components(
            QualityComponents {
                fidelity: 0.85,
                coherence: 0.90,
                completeness: 0.88,
                efficiency: 0.92,
            },
        ));
        let record = quality.to_record();
        assert_eq!(record.len(), 5);
        for key in ["fidelity", "coherence", "completeness", "efficiency", "overall_quality"] {
            assert!(record.contains_key(key));
        }
        assert!((quality.overall() - 0.8875).abs() < 1e-12);
    }

    #[test]
    fn untagged_deserialization_picks_variant() {
        let unscored: TransformationQuality =
            serde_json::from_str(r#"{"quality_score": 0.0}"#).unwrap();
        assert!(!unscored.is_scored());
        assert!(unscored.metrics().is_none());

        let scored: TransformationQuality = serde_json::from_str(
            r#"{"fidelity":1,"coherence":1,"completeness":1,"efficiency":1,"overall_quality":1}"#,
        )
        .unwrap();
        assert!(scored.is_scored());
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let m = QualityMetrics::from_components(QualityComponents {
            fidelity: 1.5,
            coherence: -0.2,
            completeness: f64::NAN,
            efficiency: 0.5,
        });
        assert_eq!(m.fidelity, 1.0);
        assert_eq!(m.coherence, 0.0);
        assert_eq!(m.completeness, 0.0);
        assert!((m.overall_quality - 0.375).abs() < 1e-12);
    }

    #[test]
    fn display_formats() {
        assert!(TransformationQuality::unscored().to_string().contains("score=0.000"));
    }

    proptest! {
        #[test]
        fn overall_is_mean_of_components(
            f in 0.0f64..=1.0,
            c in 0.0f64..=1.0,
            p in 0.0f64..=1.0,
            e in 0.0f64..=1.0,
        ) {
            let m = QualityMetrics::from_components(QualityComponents {
                fidelity: f,
                coherence: c,
                completeness: p,
                efficiency: e,
            });
            let mean = (m.fidelity + m.coherence + m.completeness + m.efficiency) / 4.0;
            prop_assert!((m.overall_quality - mean).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&m.overall_quality));
        }
    }
}
