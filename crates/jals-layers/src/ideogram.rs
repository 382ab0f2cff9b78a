//! The core ideogram: one manuscript carried from raw strokes to
//! computational tokens, with its own operation log.

use std::path::Path;

use chrono::{DateTime, Utc};
use jals_types::{into_record, Record, RecordExt, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::error::{LayerError, LayerResult};
use crate::layer1::{FeatureSet, ManuscriptEncoder};
use crate::layer2::SymbolKind;
use crate::layer3::id_label;

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for an ideogram.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdeogramId(pub String);

impl IdeogramId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for IdeogramId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdeogramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ideogram:{}", self.0)
    }
}

// ── Events ───────────────────────────────────────────────────────────

/// Operations an ideogram logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeogramOperation {
    LoadManuscript,
    ExtractFeatures,
    GenerateSymbolicRepresentation,
    ToComputationalRepresentation,
    Save,
}

/// One entry in an ideogram's log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdeogramEvent {
    pub operation: IdeogramOperation,
    pub timestamp: DateTime<Utc>,
    pub params: Record,
}

/// The ideogram's data as written by `save`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeogramData {
    pub strokes: Vec<Value>,
    pub metadata: Record,
    pub symbolic_representation: Option<Record>,
    pub computational_representation: Option<Record>,
}

// ── Core Ideogram ────────────────────────────────────────────────────

/// A manuscript and the representations derived from it.
#[derive(Clone, Debug, Default)]
pub struct CoreIdeogram {
    id: IdeogramId,
    data: IdeogramData,
    history: Vec<IdeogramEvent>,
}

impl CoreIdeogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &IdeogramId {
        &self.id
    }

    pub fn data(&self) -> &IdeogramData {
        &self.data
    }

    pub fn history(&self) -> &[IdeogramEvent] {
        &self.history
    }

    /// Load strokes and metadata from a raw manuscript record.
    pub fn load_manuscript(&mut self, manuscript: &Record) {
        self.data.strokes = manuscript.list("strokes").to_vec();
        self.data.metadata = manuscript.object_or_empty("metadata");
        self.log(
            IdeogramOperation::LoadManuscript,
            json!({"format": "raw", "strokes": self.data.strokes.len()}),
        );
    }

    /// Load strokes and metadata from a JSON manuscript file.
    pub fn load_manuscript_file(&mut self, path: impl AsRef<Path>) -> LayerResult<()> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let manuscript = into_record(serde_json::from_str(&contents)?);

        self.data.strokes = manuscript.list("strokes").to_vec();
        self.data.metadata = manuscript.object_or_empty("metadata");
        self.log(
            IdeogramOperation::LoadManuscript,
            json!({"format": "json", "source": path.display().to_string()}),
        );
        Ok(())
    }

    /// Extract per-stroke features from the loaded strokes.
    pub fn extract_features(&mut self) -> LayerResult<FeatureSet> {
        let manuscript = into_record(json!({"strokes": self.data.strokes}));
        let mut encoder = ManuscriptEncoder::default();
        encoder.preprocess(Some(&manuscript))?;
        let features = encoder.extract_features(None)?;

        self.log(
            IdeogramOperation::ExtractFeatures,
            json!({"strokes": features.stroke_count()}),
        );
        Ok(features)
    }

    /// Build symbols for every stroke from `features`.
    pub fn generate_symbolic_representation(&mut self, features: &FeatureSet) {
        let symbols: Vec<Value> = self
            .data
            .strokes
            .iter()
            .enumerate()
            .map(|(i, stroke)| {
                let kind = match (features.geometric.get(i), features.topological.get(i)) {
                    (Some(g), Some(t)) => SymbolKind::from_features(g, t).as_str(),
                    _ => "unknown",
                };
                json!({
                    "id": stroke.get("id").cloned().unwrap_or_else(|| json!(i)),
                    "type": kind,
                    "attributes": {
                        "length": features.geometric.get(i).map(|g| g.length),
                        "curvature": features.geometric.get(i).map(|g| g.curvature),
                    },
                    "relations": [],
                })
            })
            .collect();

        let symbolic = into_record(json!({
            "symbols": symbols,
            "relationships": [],
            "semiotic_attributes": {},
        }));
        self.log(
            IdeogramOperation::GenerateSymbolicRepresentation,
            json!({"symbols": symbols.len()}),
        );
        self.data.symbolic_representation = Some(symbolic);
    }

    /// Convert the symbolic representation into tokens.
    ///
    /// Fails if no symbolic representation has been generated.
    pub fn to_computational_representation(&mut self) -> LayerResult<Record> {
        let symbolic = self
            .data
            .symbolic_representation
            .as_ref()
            .ok_or(LayerError::MissingInput("symbolic representation"))?;

        let tokens: Vec<String> = symbolic
            .list("symbols")
            .iter()
            .map(|s| format!("TOKEN_{}", id_label(&s["id"])))
            .collect();
        let computational = into_record(json!({
            "tokens": tokens,
            "embeddings": null,
            "graph": null,
            "executable_code": null,
        }));

        self.log(
            IdeogramOperation::ToComputationalRepresentation,
            json!({"tokens": tokens.len()}),
        );
        self.data.computational_representation = Some(computational.clone());
        Ok(computational)
    }

    /// Write the ideogram data to `path` as indented JSON.
    pub fn save(&mut self, path: impl AsRef<Path>) -> LayerResult<()> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(&self.data)?)?;

        info!(id = %self.id, path = %path.display(), "ideogram saved");
        self.log(
            IdeogramOperation::Save,
            json!({"filepath": path.display().to_string(), "format": "json"}),
        );
        Ok(())
    }

    fn log(&mut self, operation: IdeogramOperation, params: Value) {
        debug!(id = %self.id, ?operation, "ideogram operation");
        self.history.push(IdeogramEvent {
            operation,
            timestamp: Utc::now(),
            params: into_record(params),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manuscript() -> Record {
        into_record(json!({
            "strokes": [
                {"id": "o", "points": [[0, 0], [1, 0], [1, 1], [0, 0]]},
                {"points": [[0, 0], [5, 0]]}
            ],
            "metadata": {"script": "test"}
        }))
    }

    #[test]
    fn ids_are_unique() {
        let a = IdeogramId::new();
        let b = IdeogramId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("ideogram:"));
    }

    #[test]
    fn full_lifecycle() {
        let mut ideogram = CoreIdeogram::new();
        ideogram.load_manuscript(&manuscript());
        assert_eq!(ideogram.data().strokes.len(), 2);
        assert_eq!(ideogram.data().metadata["script"], json!("test"));

        let features = ideogram.extract_features().unwrap();
        ideogram.generate_symbolic_representation(&features);

        let symbolic = ideogram.data().symbolic_representation.as_ref().unwrap();
        assert_eq!(symbolic["symbols"][0]["type"], json!("closed_symbol"));
        assert_eq!(symbolic["symbols"][1]["type"], json!("linear_symbol"));

        let computational = ideogram.to_computational_representation().unwrap();
        assert_eq!(computational["tokens"], json!(["TOKEN_o", "TOKEN_1"]));
        assert!(computational["embeddings"].is_null());

        let ops: Vec<IdeogramOperation> = ideogram.history().iter().map(|e| e.operation).collect();
        assert_eq!(
            ops,
            vec![
                IdeogramOperation::LoadManuscript,
                IdeogramOperation::ExtractFeatures,
                IdeogramOperation::GenerateSymbolicRepresentation,
                IdeogramOperation::ToComputationalRepresentation,
            ]
        );
    }

    #[test]
    fn computational_requires_symbolic() {
        let mut ideogram = CoreIdeogram::new();
        ideogram.load_manuscript(&manuscript());
        let err = ideogram.to_computational_representation().unwrap_err();
        assert!(matches!(err, LayerError::MissingInput(_)));
        assert_eq!(ideogram.history().len(), 1);
    }

    #[test]
    fn file_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("manuscript.json");
        std::fs::write(&input, serde_json::to_string(&manuscript()).unwrap()).unwrap();

        let mut ideogram = CoreIdeogram::new();
        ideogram.load_manuscript_file(&input).unwrap();
        let features = ideogram.extract_features().unwrap();
        ideogram.generate_symbolic_representation(&features);

        let output = dir.path().join("ideogram.json");
        ideogram.save(&output).unwrap();

        let saved: IdeogramData =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(&saved, ideogram.data());
        assert_eq!(ideogram.history().last().unwrap().operation, IdeogramOperation::Save);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut ideogram = CoreIdeogram::new();
        let err = ideogram
            .load_manuscript_file("/nonexistent/manuscript.json")
            .unwrap_err();
        assert!(matches!(err, LayerError::Io(_)));
    }
}
