//! Layer 3: language integration.
//!
//! Maps symbols onto linguistic units by symbol type, derives grammatical
//! structures, links every pair of units in a semantic network, and
//! renders the units in several modalities.

use chrono::Utc;
use jals_types::{into_record, Record, RecordExt, Value};
use serde_json::json;
use tracing::debug;

use crate::error::{LayerError, LayerResult};

/// Strength of every pairwise semantic association.
const ASSOCIATION_STRENGTH: f64 = 0.5;

/// Linguistic category for a layer 2 symbol type.
pub fn category_for(symbol_type: &str) -> &'static str {
    match symbol_type {
        "closed_symbol" => "noun",
        "curved_symbol" => "verb",
        "linear_symbol" => "adjective",
        _ => "unknown",
    }
}

/// Render an id value without JSON quoting, e.g. `s1` or `7`.
pub(crate) fn id_label(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Stateless layer 3 stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct LanguageIntegrator;

impl LanguageIntegrator {
    pub fn new() -> Self {
        Self
    }

    /// Integrate layer 2 symbols into linguistic structures.
    ///
    /// Every symbol must carry an `id`.
    pub fn integrate(&self, layer2: &Record) -> LayerResult<Record> {
        let symbols = layer2.list("symbols");
        let relationships = layer2.list("relationships");

        let units = symbols
            .iter()
            .map(linguistic_unit)
            .collect::<LayerResult<Vec<_>>>()?;
        let grammar = grammatical_structures(&units, relationships);
        let network = semantic_network(&units);
        let multimodal = multimodal_representations(&units, &network);

        debug!(units = units.len(), "symbols integrated");

        Ok(into_record(json!({
            "linguistic_units": units,
            "grammatical_structures": grammar,
            "semantic_network": network,
            "multimodal_representations": multimodal,
            "metadata": layer2.object_or_empty("metadata"),
            "integration_metadata": {
                "layer": "language_integration",
                "version": "1.0",
                "timestamp": Utc::now().to_rfc3339(),
                "source_symbols": symbols.len(),
            }
        })))
    }
}

fn linguistic_unit(symbol: &Value) -> LayerResult<Value> {
    let id = symbol
        .get("id")
        .filter(|id| !id.is_null())
        .ok_or_else(|| LayerError::MissingField("id".into()))?;
    let symbol_type = symbol.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let properties = symbol.get("properties").cloned().unwrap_or_else(|| json!({}));

    Ok(json!({
        "id": id,
        "category": category_for(symbol_type),
        "features": {
            "morphological": {
                "complexity": properties.get("complexity").cloned().unwrap_or(json!(0)),
                "regularity": properties.get("regularity").cloned().unwrap_or(json!(0.5)),
            },
            "syntactic": {
                "valency": 2,
                "subcategorization": ["NP", "PP"],
            },
            "semantic": {
                "animacy": "inanimate",
                "concreteness": 0.8,
            }
        },
        "phonological_form": {
            "segments": ["s", "i", "m", "b", "o", "l"],
            "syllable_structure": "CV.CVC",
            "stress_pattern": "trochee",
        },
        "semantic_content": {
            "core_meaning": format!("concept_{}", id_label(id)),
            "semantic_roles": ["agent", "theme"],
        },
        "pragmatic_properties": {
            "discourse_function": "referential",
            "register": "neutral",
        }
    }))
}

fn grammatical_structures(units: &[Value], relationships: &[Value]) -> Value {
    let syntactic_trees: Vec<Value> = units
        .first()
        .map(|head| {
            let children: Vec<&Value> = units[1..].iter().map(|u| &u["id"]).collect();
            vec![json!({"type": "phrase", "head": head["id"], "children": children})]
        })
        .unwrap_or_default();
    let dependencies: Vec<Value> = relationships
        .iter()
        .map(|r| json!({"head": r["source"], "dependent": r["target"], "relation": r["type"]}))
        .collect();

    json!({
        "syntactic_trees": syntactic_trees,
        "grammar_rules": [{"rule": "S -> NP VP", "probability": 0.8}],
        "morphological_patterns": [{"pattern": "stem + suffix", "frequency": 0.6}],
        "constituency_structure": {"type": "tree", "root": "S", "children": []},
        "dependency_structure": {"type": "graph", "dependencies": dependencies},
    })
}

fn semantic_network(units: &[Value]) -> Value {
    let nodes: Vec<Value> = units
        .iter()
        .map(|u| {
            json!({
                "id": u["id"],
                "concept": u["semantic_content"]["core_meaning"],
                "features": u["features"]["semantic"],
                "type": "concept_node",
            })
        })
        .collect();

    let mut edges = Vec::new();
    for (i, a) in units.iter().enumerate() {
        for b in &units[i + 1..] {
            edges.push(json!({
                "source": a["id"],
                "target": b["id"],
                "relation": "semantic_association",
                "strength": ASSOCIATION_STRENGTH,
            }));
        }
    }

    let n = nodes.len();
    let density = if n > 1 {
        edges.len() as f64 / (n * (n - 1) / 2) as f64
    } else {
        0.0
    };

    json!({
        "nodes": nodes,
        "edges": edges,
        "properties": {
            "density": density,
            "clustering_coefficient": 0.6,
            "average_path_length": 2.3,
        }
    })
}

fn multimodal_representations(units: &[Value], network: &Value) -> Value {
    let textual = units
        .iter()
        .map(|u| format!("unit_{}", id_label(&u["id"])))
        .collect::<Vec<_>>()
        .join(" ");
    let node_count = network["nodes"].as_array().map_or(0, Vec::len);

    json!({
        "textual": textual,
        "visual": {"type": "graph_visualization", "nodes": node_count},
        "auditory": {"type": "phonetic_sequence", "duration": units.len() as f64 * 0.5},
        "gestural": {"type": "gesture_sequence", "movements": units.len()},
        "cross_modal_mappings": {
            "mappings": [{"source": "visual", "target": "auditory", "strength": 0.7}]
        },
    })
}
