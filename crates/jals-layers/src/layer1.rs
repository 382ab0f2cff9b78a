//! Layer 1: manuscript encoding.
//!
//! Captures raw stroke data, preprocesses it, extracts per-stroke
//! features, and encodes everything into the record shape layer 2
//! consumes. Each step may be called without an argument, in which case
//! it works on what the previous step produced.
//!
//! ```text
//! capture ──→ raw ──→ preprocess ──→ processed ──→ extract_features
//!                                        │                │
//!                                        └──→ encode ←────┘
//! ```

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use jals_types::{into_record, Record, RecordExt, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::StageConfig;
use crate::error::{LayerError, LayerResult};

// ── Source Kind ──────────────────────────────────────────────────────

/// Where raw manuscript data comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A JSON file with `strokes` and `metadata`.
    File,
    /// A capture device, identified by name.
    Device,
    /// A stream endpoint.
    Stream,
}

impl FromStr for SourceKind {
    type Err = LayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "device" => Ok(Self::Device),
            "stream" => Ok(Self::Stream),
            other => Err(LayerError::UnsupportedSource(other.to_string())),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Device => write!(f, "device"),
            Self::Stream => write!(f, "stream"),
        }
    }
}

// ── Features ─────────────────────────────────────────────────────────

/// Shape features of one stroke.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometricFeatures {
    /// Polyline length.
    pub length: f64,
    /// Mean absolute turning angle between consecutive segments, radians.
    pub curvature: f64,
    /// Absolute shoelace area of the (implicitly closed) polygon.
    pub area: f64,
    /// Mean of all points.
    pub centroid: Vec<f64>,
}

/// Motion features of one stroke, derived from `timestamps` and `pressure`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicFeatures {
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub jerk: Vec<f64>,
    pub pressure_profile: Vec<f64>,
}

/// Structural features of one stroke. Index pairs refer to segments
/// (`intersections`) or points (`loops`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologicalFeatures {
    pub intersections: Vec<[usize; 2]>,
    pub loops: Vec<[usize; 2]>,
    pub branches: Vec<[usize; 2]>,
    pub endpoints: Vec<usize>,
}

/// Distribution of segment lengths within one stroke.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalFeatures {
    pub mean: f64,
    pub std: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

/// Features for every stroke, index-aligned with the processed strokes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub geometric: Vec<GeometricFeatures>,
    pub kinematic: Vec<KinematicFeatures>,
    pub topological: Vec<TopologicalFeatures>,
    pub statistical: Vec<StatisticalFeatures>,
}

impl FeatureSet {
    pub fn stroke_count(&self) -> usize {
        self.geometric.len()
    }

    /// Global summary over all strokes.
    pub fn global_features(&self) -> Value {
        let total_strokes = self.stroke_count();
        let total_length: f64 = self.geometric.iter().map(|g| g.length).sum();
        let structural: usize = self
            .topological
            .iter()
            .map(|t| t.loops.len() + t.intersections.len())
            .sum();
        let complexity_index = if total_strokes == 0 {
            0.0
        } else {
            structural as f64 / total_strokes as f64
        };

        json!({
            "total_strokes": total_strokes,
            "total_length": total_length,
            "complexity_index": complexity_index,
            "symmetry_index": 0.0,
        })
    }
}

// ── Manuscript Encoder ───────────────────────────────────────────────

/// Stateful layer 1 stage.
#[derive(Clone, Debug, Default)]
pub struct ManuscriptEncoder {
    config: StageConfig,
    raw_data: Option<Record>,
    processed_data: Option<Record>,
    features: Option<FeatureSet>,
}

impl ManuscriptEncoder {
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build an encoder from a YAML stage configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> LayerResult<Self> {
        Ok(Self::new(StageConfig::load(path)?))
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn raw_data(&self) -> Option<&Record> {
        self.raw_data.as_ref()
    }

    pub fn processed_data(&self) -> Option<&Record> {
        self.processed_data.as_ref()
    }

    pub fn features(&self) -> Option<&FeatureSet> {
        self.features.as_ref()
    }

    /// Read raw manuscript data from `source`.
    pub fn capture(&mut self, source: &str, kind: SourceKind) -> LayerResult<Record> {
        let raw = match kind {
            SourceKind::File => {
                let contents = std::fs::read_to_string(source)?;
                into_record(serde_json::from_str(&contents)?)
            }
            SourceKind::Device => into_record(json!({"strokes": [], "metadata": {"device": source}})),
            SourceKind::Stream => into_record(json!({"strokes": [], "metadata": {"stream": source}})),
        };

        debug!(source, kind = %kind, strokes = raw.list("strokes").len(), "manuscript captured");
        self.raw_data = Some(raw.clone());
        Ok(raw)
    }

    /// Copy strokes and metadata into the processed shape.
    pub fn preprocess(&mut self, raw: Option<&Record>) -> LayerResult<Record> {
        let data = raw
            .or(self.raw_data.as_ref())
            .ok_or(LayerError::MissingInput("data to preprocess"))?;

        let strokes = data.list("strokes").to_vec();
        let processed = into_record(json!({
            "preprocessing_info": {"strokes_processed": strokes.len()},
            "strokes": strokes,
            "metadata": data.object_or_empty("metadata"),
        }));

        self.processed_data = Some(processed.clone());
        Ok(processed)
    }

    /// Compute the four feature families for every processed stroke.
    pub fn extract_features(&mut self, processed: Option<&Record>) -> LayerResult<FeatureSet> {
        let data = processed
            .or(self.processed_data.as_ref())
            .ok_or(LayerError::MissingInput("processed data"))?;

        let mut features = FeatureSet::default();
        for stroke in data.list("strokes") {
            let stroke = stroke
                .as_object()
                .ok_or_else(|| LayerError::InvalidData("stroke must be an object".into()))?;
            let points = parse_points(stroke)?;
            let segments = segment_lengths(&points);

            features.geometric.push(geometric_features(&points, &segments));
            features.kinematic.push(kinematic_features(stroke, &segments));
            features
                .topological
                .push(topological_features(&points, self.config.closure_tolerance));
            features.statistical.push(statistical_features(&segments));
        }

        debug!(strokes = features.stroke_count(), "features extracted");
        self.features = Some(features.clone());
        Ok(features)
    }

    /// Encode per-stroke and global features for layer 2.
    ///
    /// Stroke ids come from the processed strokes; a stroke without an id
    /// is identified by its index.
    pub fn encode(&self, features: Option<&FeatureSet>) -> LayerResult<Record> {
        let feats = features
            .or(self.features.as_ref())
            .ok_or(LayerError::MissingInput("features for encoding"))?;
        let processed = self
            .processed_data
            .as_ref()
            .ok_or(LayerError::MissingInput("processed data"))?;

        let strokes: Vec<Value> = processed
            .list("strokes")
            .iter()
            .enumerate()
            .map(|(i, stroke)| {
                json!({
                    "id": stroke.get("id").cloned().unwrap_or_else(|| json!(i)),
                    "geometric": feats.geometric.get(i),
                    "kinematic": feats.kinematic.get(i),
                    "topological": feats.topological.get(i),
                    "statistical": feats.statistical.get(i),
                })
            })
            .collect();

        Ok(into_record(json!({
            "strokes": strokes,
            "global_features": feats.global_features(),
            "metadata": processed.object_or_empty("metadata"),
            "encoding_metadata": {
                "layer": "manuscript_encoding",
                "version": "1.0",
                "timestamp": Utc::now().to_rfc3339(),
            }
        })))
    }

    /// Run preprocess, extract and encode over `raw` in one go.
    pub fn encode_manuscript(&mut self, raw: &Record) -> LayerResult<Record> {
        self.raw_data = Some(raw.clone());
        self.preprocess(None)?;
        self.extract_features(None)?;
        self.encode(None)
    }
}

// ── Geometry ─────────────────────────────────────────────────────────

fn parse_points(stroke: &Record) -> LayerResult<Vec<Vec<f64>>> {
    stroke
        .list("points")
        .iter()
        .map(|point| {
            point
                .as_array()
                .ok_or_else(|| LayerError::InvalidData(format!("point must be a list, got {}", point)))?
                .iter()
                .map(|c| {
                    c.as_f64().ok_or_else(|| {
                        LayerError::InvalidData(format!("coordinate must be a number, got {}", c))
                    })
                })
                .collect()
        })
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn segment_lengths(points: &[Vec<f64>]) -> Vec<f64> {
    points.windows(2).map(|w| distance(&w[0], &w[1])).collect()
}

fn xy(point: &[f64]) -> (f64, f64) {
    (
        point.first().copied().unwrap_or(0.0),
        point.get(1).copied().unwrap_or(0.0),
    )
}

fn geometric_features(points: &[Vec<f64>], segments: &[f64]) -> GeometricFeatures {
    let dims = points.iter().map(Vec::len).max().unwrap_or(0);
    let centroid = if points.is_empty() {
        vec![0.0, 0.0]
    } else {
        (0..dims)
            .map(|d| {
                points.iter().map(|p| p.get(d).copied().unwrap_or(0.0)).sum::<f64>()
                    / points.len() as f64
            })
            .collect()
    };

    GeometricFeatures {
        length: segments.iter().sum(),
        curvature: mean_turning_angle(points),
        area: shoelace_area(points),
        centroid,
    }
}

fn mean_turning_angle(points: &[Vec<f64>]) -> f64 {
    let headings: Vec<f64> = points
        .windows(2)
        .filter_map(|w| {
            let (x0, y0) = xy(&w[0]);
            let (x1, y1) = xy(&w[1]);
            let (dx, dy) = (x1 - x0, y1 - y0);
            (dx != 0.0 || dy != 0.0).then(|| dy.atan2(dx))
        })
        .collect();
    if headings.len() < 2 {
        return 0.0;
    }

    let turns: Vec<f64> = headings
        .windows(2)
        .map(|h| {
            let mut turn = h[1] - h[0];
            while turn > std::f64::consts::PI {
                turn -= 2.0 * std::f64::consts::PI;
            }
            while turn < -std::f64::consts::PI {
                turn += 2.0 * std::f64::consts::PI;
            }
            turn.abs()
        })
        .collect();
    turns.iter().sum::<f64>() / turns.len() as f64
}

fn shoelace_area(points: &[Vec<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..points.len() {
        let (x0, y0) = xy(&points[i]);
        let (x1, y1) = xy(&points[(i + 1) % points.len()]);
        twice_area += x0 * y1 - x1 * y0;
    }
    (twice_area / 2.0).abs()
}

fn kinematic_features(stroke: &Record, segments: &[f64]) -> KinematicFeatures {
    let numbers = |key: &str| -> Vec<f64> {
        stroke.list(key).iter().filter_map(Value::as_f64).collect()
    };
    let timestamps = numbers("timestamps");
    let pressure_profile = numbers("pressure");

    if timestamps.len() != segments.len() + 1 || segments.is_empty() {
        return KinematicFeatures {
            pressure_profile,
            ..KinematicFeatures::default()
        };
    }

    let dts: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    let rate = |values: &[f64], offset: usize| -> Vec<f64> {
        values
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let dt = dts[i + offset];
                if dt > 0.0 {
                    (w[1] - w[0]) / dt
                } else {
                    0.0
                }
            })
            .collect()
    };

    let velocity: Vec<f64> = segments
        .iter()
        .zip(&dts)
        .map(|(len, dt)| if *dt > 0.0 { len / dt } else { 0.0 })
        .collect();
    let acceleration = rate(&velocity, 1);
    let jerk = rate(&acceleration, 2);

    KinematicFeatures {
        velocity,
        acceleration,
        jerk,
        pressure_profile,
    }
}

fn topological_features(points: &[Vec<f64>], closure_tolerance: f64) -> TopologicalFeatures {
    let n = points.len();
    let closed = n >= 3 && distance(&points[0], &points[n - 1]) < closure_tolerance;

    let mut intersections = Vec::new();
    for i in 0..n.saturating_sub(1) {
        for j in (i + 2)..n.saturating_sub(1) {
            // closing segment shares the start point with segment 0
            if closed && i == 0 && j == n - 2 {
                continue;
            }
            if segments_cross(&points[i], &points[i + 1], &points[j], &points[j + 1]) {
                intersections.push([i, j]);
            }
        }
    }

    TopologicalFeatures {
        intersections,
        loops: if closed { vec![[0, n - 1]] } else { Vec::new() },
        branches: Vec::new(),
        endpoints: match (closed, n) {
            (true, _) | (_, 0) => Vec::new(),
            (false, 1) => vec![0],
            (false, _) => vec![0, n - 1],
        },
    }
}

fn segments_cross(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> bool {
    fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }
    let (a, b, c, d) = (xy(a), xy(b), xy(c), xy(d));
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

fn statistical_features(segments: &[f64]) -> StatisticalFeatures {
    if segments.is_empty() {
        return StatisticalFeatures::default();
    }
    let n = segments.len() as f64;
    let mean = segments.iter().sum::<f64>() / n;
    let moment = |k: i32| segments.iter().map(|s| (s - mean).powi(k)).sum::<f64>() / n;
    let variance = moment(2);
    let std = variance.sqrt();

    let (skewness, kurtosis) = if std > 0.0 {
        (moment(3) / std.powi(3), moment(4) / variance.powi(2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    StatisticalFeatures {
        mean,
        std,
        skewness,
        kurtosis,
    }
}
