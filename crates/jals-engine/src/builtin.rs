//! Built-in layer transformers.
//!
//! `StrokesToSymbols` maps encoded strokes (layer 1) to geometric symbols
//! (layer 2). `SymbolsToLinguistic` maps symbols (layer 2) to morpheme
//! units (layer 3). Both expose their configuration and accept
//! optimization hints.

use chrono::Utc;
use jals_types::{
    into_record, OperationPattern, Record, RecordExt, Value, LINGUISTIC_LAYER, MANUSCRIPT_LAYER,
    SYMBOLIC_LAYER,
};
use serde_json::json;

use crate::error::{TransformError, TransformResult};
use crate::transformer::{HookOutcome, Transformer, TuningState};

/// Default first-to-last point distance below which a stroke is closed.
pub const DEFAULT_CLOSURE_TOLERANCE: f64 = 0.1;

/// Strength assigned to every pairwise spatial relationship.
const PROXIMITY_STRENGTH: f64 = 0.5;

fn transformation_info(source: &str, target: &str) -> Value {
    json!({
        "source_layer": source,
        "target_layer": target,
        "timestamp": Utc::now().to_rfc3339(),
    })
}

// ── Strokes → Symbols ────────────────────────────────────────────────

/// Transformer from layer 1 strokes to layer 2 symbols.
///
/// Config keys: `closure_tolerance` (number, default 0.1).
#[derive(Clone, Debug, Default)]
pub struct StrokesToSymbols {
    config: Record,
    tuning: TuningState,
}

impl StrokesToSymbols {
    /// Registry name for this transformer.
    pub const NAME: &'static str = "layer1_to_layer2";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Record) -> Self {
        Self {
            config,
            tuning: TuningState::default(),
        }
    }

    pub fn tuning(&self) -> &TuningState {
        &self.tuning
    }

    fn closure_tolerance(&self) -> f64 {
        self.config
            .number("closure_tolerance")
            .unwrap_or(DEFAULT_CLOSURE_TOLERANCE)
    }

    fn stroke_to_symbol(&self, stroke: &Value) -> TransformResult<Value> {
        let stroke = stroke
            .as_object()
            .ok_or_else(|| TransformError::InvalidInput("stroke must be an object".into()))?;
        let points = stroke.list("points");

        Ok(json!({
            "id": stroke.get("id").cloned().unwrap_or(Value::Null),
            "type": "geometric_symbol",
            "properties": {
                "complexity": points.len(),
                "closed": is_closed(points, self.closure_tolerance())?,
                "curvature": stroke.number("curvature").unwrap_or(0.0),
            }
        }))
    }
}

fn parse_point(point: &Value) -> TransformResult<Vec<f64>> {
    point
        .as_array()
        .ok_or_else(|| TransformError::InvalidInput(format!("point must be a list, got {}", point)))?
        .iter()
        .map(|c| {
            c.as_f64().ok_or_else(|| {
                TransformError::InvalidInput(format!("point coordinate must be a number, got {}", c))
            })
        })
        .collect()
}

/// A stroke is closed when it has at least three points and its first and
/// last points lie within `tolerance` of each other.
fn is_closed(points: &[Value], tolerance: f64) -> TransformResult<bool> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(false);
    };
    if points.len() < 3 {
        return Ok(false);
    }

    let first = parse_point(first)?;
    let last = parse_point(last)?;
    if first.len() != last.len() {
        return Err(TransformError::InvalidInput(format!(
            "first and last points differ in dimension ({} vs {})",
            first.len(),
            last.len()
        )));
    }

    let distance = first
        .iter()
        .zip(&last)
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt();
    Ok(distance < tolerance)
}

fn pairwise_relationships(symbols: &[Value]) -> Vec<Value> {
    let mut relationships = Vec::new();
    for (i, a) in symbols.iter().enumerate() {
        for b in &symbols[i + 1..] {
            relationships.push(json!({
                "source": a["id"],
                "target": b["id"],
                "type": "spatial_proximity",
                "strength": PROXIMITY_STRENGTH,
            }));
        }
    }
    relationships
}

impl Transformer for StrokesToSymbols {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, input: &Record) -> TransformResult<Record> {
        let symbols = input
            .list("strokes")
            .iter()
            .map(|stroke| self.stroke_to_symbol(stroke))
            .collect::<TransformResult<Vec<_>>>()?;
        let relationships = pairwise_relationships(&symbols);

        Ok(into_record(json!({
            "symbols": symbols,
            "relationships": relationships,
            "metadata": input.object_or_empty("metadata"),
            "transformation_info": transformation_info(MANUSCRIPT_LAYER, SYMBOLIC_LAYER),
        })))
    }

    fn config(&self) -> Option<Record> {
        Some(self.config.clone())
    }

    fn optimize(&mut self, patterns: &[OperationPattern]) -> TransformResult<HookOutcome> {
        self.tuning.absorb(patterns);
        Ok(HookOutcome::Applied)
    }
}

// ── Symbols → Linguistic Units ───────────────────────────────────────

/// Transformer from layer 2 symbols to layer 3 linguistic units.
#[derive(Clone, Debug, Default)]
pub struct SymbolsToLinguistic {
    config: Record,
    tuning: TuningState,
}

impl SymbolsToLinguistic {
    /// Registry name for this transformer.
    pub const NAME: &'static str = "layer2_to_layer3";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Record) -> Self {
        Self {
            config,
            tuning: TuningState::default(),
        }
    }

    pub fn tuning(&self) -> &TuningState {
        &self.tuning
    }

    fn symbol_to_unit(symbol: &Value) -> TransformResult<Value> {
        let symbol = symbol
            .as_object()
            .ok_or_else(|| TransformError::InvalidInput("symbol must be an object".into()))?;
        let id = symbol
            .get("id")
            .ok_or_else(|| TransformError::MissingField("id".into()))?;

        Ok(json!({
            "id": id,
            "type": "morpheme",
            "semantic_features": {
                "category": "noun",
                "animacy": "inanimate",
                "concreteness": 0.8,
            },
            "phonological_features": {
                "syllables": 2,
                "stress_pattern": "trochee",
            }
        }))
    }

    fn semantic_network(units: &[Value]) -> Value {
        let nodes: Vec<Value> = units
            .iter()
            .map(|unit| json!({"id": unit["id"], "type": unit["type"]}))
            .collect();
        json!({
            "nodes": nodes,
            "edges": [],
            "properties": {
                "density": 0.3,
                "clustering_coefficient": 0.6,
            }
        })
    }
}

impl Transformer for SymbolsToLinguistic {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, input: &Record) -> TransformResult<Record> {
        let units = input
            .list("symbols")
            .iter()
            .map(Self::symbol_to_unit)
            .collect::<TransformResult<Vec<_>>>()?;
        let network = Self::semantic_network(&units);

        Ok(into_record(json!({
            "linguistic_units": units,
            "grammar_rules": [{
                "rule_id": "r1",
                "type": "phrase_structure",
                "pattern": "NP -> Det N",
                "probability": 0.8,
            }],
            "semantic_network": network,
            "metadata": input.object_or_empty("metadata"),
            "transformation_info": transformation_info(SYMBOLIC_LAYER, LINGUISTIC_LAYER),
        })))
    }

    fn config(&self) -> Option<Record> {
        Some(self.config.clone())
    }

    fn optimize(&mut self, patterns: &[OperationPattern]) -> TransformResult<HookOutcome> {
        self.tuning.absorb(patterns);
        Ok(HookOutcome::Applied)
    }
}
