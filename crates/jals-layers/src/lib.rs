//! # jals-layers
//!
//! The four JALS layer stages and their engine adapters.
//!
//! ## Architecture
//!
//! ```text
//! raw manuscript
//!      │
//!      ▼
//! ManuscriptEncoder      (layer1: capture → preprocess → features → encode)
//!      │  AbstractionStage   layer1_to_layer2
//!      ▼
//! SymbolicAbstractor     (layer2: symbols, relationships, hierarchy)
//!      │  IntegrationStage   layer2_to_layer3
//!      ▼
//! LanguageIntegrator     (layer3: units, grammar, semantic network)
//!      │  DeploymentStage    layer3_to_layer4
//!      ▼
//! ComputationalDeployer  (layer4: code, API, targets, monitoring)
//! ```
//!
//! `CoreIdeogram` carries a single manuscript through feature extraction
//! and symbolic/computational representations outside the engine.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod ideogram;
pub mod layer1;
pub mod layer2;
pub mod layer3;
pub mod layer4;
pub mod stage;

// ── Re-exports ───────────────────────────────────────────────────────

pub use config::StageConfig;
pub use error::{LayerError, LayerResult};
pub use ideogram::{CoreIdeogram, IdeogramData, IdeogramEvent, IdeogramId, IdeogramOperation};
pub use layer1::{
    FeatureSet, GeometricFeatures, KinematicFeatures, ManuscriptEncoder, SourceKind,
    StatisticalFeatures, TopologicalFeatures,
};
pub use layer2::{SymbolKind, SymbolicAbstractor};
pub use layer3::{category_for, LanguageIntegrator};
pub use layer4::{ComputationalDeployer, DeploymentTarget};
pub use stage::{register_pipeline, AbstractionStage, DeploymentStage, IntegrationStage};
