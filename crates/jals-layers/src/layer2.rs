//! Layer 2: symbolic abstraction.
//!
//! Turns encoded strokes into classified symbols, keeps the pairwise
//! relationships stronger than the configured threshold, and groups all
//! symbols under a single composition root.

use chrono::Utc;
use jals_types::{into_record, Record, RecordExt, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::StageConfig;
use crate::layer1::{GeometricFeatures, TopologicalFeatures};

/// Curvature above which an open stroke is classified as curved.
pub const CURVED_THRESHOLD: f64 = 0.5;

const RELATIONSHIP_STRENGTH: f64 = 0.6;
const SYMBOL_CONFIDENCE: f64 = 0.85;

/// Symbol classes produced by abstraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    ClosedSymbol,
    CurvedSymbol,
    LinearSymbol,
}

impl SymbolKind {
    /// Classify encoded feature records.
    pub fn classify(geometric: &Record, topological: &Record) -> Self {
        Self::decide(
            !topological.list("loops").is_empty(),
            geometric.number("curvature").unwrap_or(0.0),
        )
    }

    /// Classify typed layer 1 features.
    pub fn from_features(geometric: &GeometricFeatures, topological: &TopologicalFeatures) -> Self {
        Self::decide(!topological.loops.is_empty(), geometric.curvature)
    }

    // loops win over curvature; anything else is linear
    fn decide(has_loops: bool, curvature: f64) -> Self {
        if has_loops {
            Self::ClosedSymbol
        } else if curvature > CURVED_THRESHOLD {
            Self::CurvedSymbol
        } else {
            Self::LinearSymbol
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClosedSymbol => "closed_symbol",
            Self::CurvedSymbol => "curved_symbol",
            Self::LinearSymbol => "linear_symbol",
        }
    }
}

/// Stateless layer 2 stage.
#[derive(Clone, Debug, Default)]
pub struct SymbolicAbstractor {
    config: StageConfig,
}

impl SymbolicAbstractor {
    pub fn new(config: StageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Abstract encoded layer 1 data into symbols.
    pub fn abstract_strokes(&self, layer1: &Record) -> Record {
        let strokes = layer1.list("strokes");
        let symbols: Vec<Value> = strokes.iter().map(stroke_to_symbol).collect();
        let relationships = self.relationships(&symbols);

        debug!(
            symbols = symbols.len(),
            relationships = relationships.len(),
            "symbols abstracted"
        );

        into_record(json!({
            "hierarchies": build_hierarchy(&symbols),
            "symbols": symbols,
            "relationships": relationships,
            "metadata": layer1.object_or_empty("metadata"),
            "abstraction_metadata": {
                "layer": "symbolic_abstraction",
                "version": "1.0",
                "timestamp": Utc::now().to_rfc3339(),
                "source_strokes": strokes.len(),
            }
        }))
    }

    fn relationships(&self, symbols: &[Value]) -> Vec<Value> {
        let mut relationships = Vec::new();
        for (i, a) in symbols.iter().enumerate() {
            for b in &symbols[i + 1..] {
                if RELATIONSHIP_STRENGTH > self.config.relationship_threshold {
                    relationships.push(relationship(a, b));
                }
            }
        }
        relationships
    }
}

fn stroke_to_symbol(stroke: &Value) -> Value {
    let stroke = stroke.as_object().cloned().unwrap_or_default();
    let geometric = stroke.object_or_empty("geometric");
    let topological = stroke.object_or_empty("topological");
    let kinematic = stroke.object_or_empty("kinematic");
    let kind = SymbolKind::classify(&geometric, &topological);

    let velocity = numbers(kinematic.list("velocity"));
    let pressure = numbers(kinematic.list("pressure_profile"));

    json!({
        "id": stroke.get("id"),
        "type": kind.as_str(),
        "properties": {
            "size": geometric.number("length").unwrap_or(0.0),
            "complexity": topological.list("intersections").len(),
            "fluency": if velocity.is_empty() { 1.0 } else { mean(&velocity) },
            "pressure_variation": std_dev(&pressure),
            "symmetry": 0.7,
            "regularity": 0.8,
        },
        "confidence": SYMBOL_CONFIDENCE,
        "source_stroke": stroke.get("id"),
        "centroid": geometric.get("centroid"),
    })
}

fn relationship(a: &Value, b: &Value) -> Value {
    let point = |v: &Value| -> Option<(f64, f64)> {
        let c = v.get("centroid")?.as_array()?;
        Some((c.first()?.as_f64()?, c.get(1)?.as_f64()?))
    };
    let (distance, orientation) = match (point(a), point(b)) {
        (Some((ax, ay)), Some((bx, by))) => {
            let (dx, dy) = (bx - ax, by - ay);
            let orientation = if dx.abs() >= dy.abs() { "horizontal" } else { "vertical" };
            ((dx * dx + dy * dy).sqrt(), orientation)
        }
        _ => (1.0, "horizontal"),
    };

    json!({
        "source": a["id"],
        "target": b["id"],
        "type": "spatial_proximity",
        "strength": RELATIONSHIP_STRENGTH,
        "properties": {
            "distance": distance,
            "orientation": orientation,
        }
    })
}

fn build_hierarchy(symbols: &[Value]) -> Value {
    let children: Vec<&Value> = symbols.iter().map(|s| &s["id"]).collect();
    json!({
        "root": {
            "type": "composition",
            "children": children,
            "properties": {
                "complexity_level": symbols.len(),
                "coherence": 0.75,
            }
        }
    })
}

fn numbers(values: &[Value]) -> Vec<f64> {
    values.iter().filter_map(Value::as_f64).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}
