//! Layer names and the composite keys transformers are registered under.

use serde::{Deserialize, Serialize};

/// Layer 1: manuscript encoding (strokes and their features).
pub const MANUSCRIPT_LAYER: &str = "layer1";
/// Layer 2: symbolic abstraction.
pub const SYMBOLIC_LAYER: &str = "layer2";
/// Layer 3: language integration.
pub const LINGUISTIC_LAYER: &str = "layer3";
/// Layer 4: computational deployment.
pub const DEPLOYMENT_LAYER: &str = "layer4";

/// The four layers in pipeline order.
pub const PIPELINE_LAYERS: [&str; 4] = [
    MANUSCRIPT_LAYER,
    SYMBOLIC_LAYER,
    LINGUISTIC_LAYER,
    DEPLOYMENT_LAYER,
];

// ── Layer Id ─────────────────────────────────────────────────────────

/// Name of a pipeline layer, e.g. `layer1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn from_name(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for LayerId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&String> for LayerId {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

// ── Direction ────────────────────────────────────────────────────────

/// Direction of an amplification step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Lower layer towards a higher one.
    Forward,
    /// Higher layer back towards a lower one.
    Reverse,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

// ── Transformer Key ──────────────────────────────────────────────────

/// Composite registry key: `(source, target, direction)`.
///
/// Renders as `{source}_to_{target}` for forward steps and
/// `{source}_to_{target}_reverse` for reverse steps. Transformers must be
/// registered under exactly this rendering for lookups to succeed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformerKey {
    pub source: LayerId,
    pub target: LayerId,
    pub direction: Direction,
}

impl TransformerKey {
    /// Key for a forward step from `source` to `target`.
    pub fn forward(source: impl Into<LayerId>, target: impl Into<LayerId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            direction: Direction::Forward,
        }
    }

    /// Key for a reverse step from `source` to `target`.
    pub fn reverse(source: impl Into<LayerId>, target: impl Into<LayerId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            direction: Direction::Reverse,
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }

    /// The registry name this key resolves to.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for TransformerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_to_{}", self.source, self.target)?;
        if self.is_reverse() {
            write!(f, "_reverse")?;
        }
        Ok(())
    }
}
