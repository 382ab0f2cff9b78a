//! Layer stages as engine transformers.
//!
//! Each adapter wraps one stage behind the `Transformer` contract and
//! exposes the stage configuration, so the whole pipeline can be driven
//! by `AmplificationEngine::multi_layer_amplify`.

use jals_engine::{AmplificationEngine, HookOutcome, TransformResult, Transformer, TuningState};
use jals_types::{
    OperationPattern, Record, TransformerKey, DEPLOYMENT_LAYER, LINGUISTIC_LAYER,
    MANUSCRIPT_LAYER, SYMBOLIC_LAYER,
};
use tracing::debug;

use crate::config::StageConfig;
use crate::layer2::SymbolicAbstractor;
use crate::layer3::LanguageIntegrator;
use crate::layer4::ComputationalDeployer;

// ── Layer 1 → Layer 2 ────────────────────────────────────────────────

/// `layer1_to_layer2`: symbolic abstraction of encoded strokes.
#[derive(Clone, Debug, Default)]
pub struct AbstractionStage {
    abstractor: SymbolicAbstractor,
    tuning: TuningState,
}

impl AbstractionStage {
    pub fn new(config: StageConfig) -> Self {
        Self {
            abstractor: SymbolicAbstractor::new(config),
            tuning: TuningState::default(),
        }
    }

    pub fn key() -> TransformerKey {
        TransformerKey::forward(MANUSCRIPT_LAYER, SYMBOLIC_LAYER)
    }

    pub fn tuning(&self) -> &TuningState {
        &self.tuning
    }
}

impl Transformer for AbstractionStage {
    fn name(&self) -> &str {
        "symbolic-abstraction"
    }

    fn transform(&self, input: &Record) -> TransformResult<Record> {
        Ok(self.abstractor.abstract_strokes(input))
    }

    fn config(&self) -> Option<Record> {
        Some(self.abstractor.config().to_record())
    }

    fn optimize(&mut self, patterns: &[OperationPattern]) -> TransformResult<HookOutcome> {
        self.tuning.absorb(patterns);
        Ok(HookOutcome::Applied)
    }
}

// ── Layer 2 → Layer 3 ────────────────────────────────────────────────

/// `layer2_to_layer3`: language integration of symbols.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegrationStage {
    integrator: LanguageIntegrator,
}

impl IntegrationStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key() -> TransformerKey {
        TransformerKey::forward(SYMBOLIC_LAYER, LINGUISTIC_LAYER)
    }
}

impl Transformer for IntegrationStage {
    fn name(&self) -> &str {
        "language-integration"
    }

    fn transform(&self, input: &Record) -> TransformResult<Record> {
        Ok(self.integrator.integrate(input)?)
    }
}

// ── Layer 3 → Layer 4 ────────────────────────────────────────────────

/// `layer3_to_layer4`: computational deployment of linguistic units.
#[derive(Clone, Debug, Default)]
pub struct DeploymentStage {
    deployer: ComputationalDeployer,
}

impl DeploymentStage {
    pub fn new(config: StageConfig) -> Self {
        Self {
            deployer: ComputationalDeployer::new(config),
        }
    }

    pub fn key() -> TransformerKey {
        TransformerKey::forward(LINGUISTIC_LAYER, DEPLOYMENT_LAYER)
    }
}

impl Transformer for DeploymentStage {
    fn name(&self) -> &str {
        "computational-deployment"
    }

    fn transform(&self, input: &Record) -> TransformResult<Record> {
        Ok(self.deployer.deploy(input)?)
    }

    fn config(&self) -> Option<Record> {
        let mut config = Record::new();
        config.insert(
            "deployment_targets".into(),
            serde_json::json!(self.deployer.targets()),
        );
        Some(config)
    }
}

/// Register all three stage adapters on `engine`.
///
/// Replaces whatever was registered under the same keys.
pub fn register_pipeline(engine: &mut AmplificationEngine, config: &StageConfig) {
    engine.register_for(
        &AbstractionStage::key(),
        Box::new(AbstractionStage::new(config.clone())),
    );
    engine.register_for(&IntegrationStage::key(), Box::new(IntegrationStage::new()));
    engine.register_for(
        &DeploymentStage::key(),
        Box::new(DeploymentStage::new(config.clone())),
    );
    debug!("layer pipeline registered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use jals_engine::{AmplifyError, TransformError};
    use jals_types::{into_record, PIPELINE_LAYERS};
    use serde_json::json;

    #[test]
    fn keys_match_registry_names() {
        assert_eq!(AbstractionStage::key().name(), "layer1_to_layer2");
        assert_eq!(IntegrationStage::key().name(), "layer2_to_layer3");
        assert_eq!(DeploymentStage::key().name(), "layer3_to_layer4");
    }

    #[test]
    fn register_pipeline_covers_all_steps() {
        let mut engine = AmplificationEngine::default();
        register_pipeline(&mut engine, &StageConfig::default());
        assert_eq!(
            engine.registry().names(),
            vec!["layer1_to_layer2", "layer2_to_layer3", "layer3_to_layer4"]
        );
        assert_eq!(engine.history().len(), 3);
    }

    #[test]
    fn stage_configs_are_exposed() {
        let mut engine = AmplificationEngine::default();
        register_pipeline(&mut engine, &StageConfig::default());
        let configs = engine.snapshot().transformer_configs;
        assert_eq!(configs.len(), 2);
        assert_eq!(configs["layer1_to_layer2"]["relationship_threshold"], json!(0.3));
        assert_eq!(configs["layer3_to_layer4"]["deployment_targets"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn stage_errors_become_transform_errors() {
        let mut engine = AmplificationEngine::default();
        register_pipeline(&mut engine, &StageConfig::default());

        let input = into_record(json!({"symbols": [{"type": "closed_symbol"}]}));
        let err = engine.amplify(&input, "layer2", "layer3").unwrap_err();
        assert!(matches!(
            err,
            AmplifyError::Transformer(TransformError::MissingField(ref f)) if f == "id"
        ));
    }

    #[test]
    fn optimize_reaches_abstraction_stage() {
        let mut stage = AbstractionStage::default();
        let outcome = stage
            .optimize(&[OperationPattern::frequency("amplify", 2)])
            .unwrap();
        assert_eq!(outcome, HookOutcome::Applied);
        assert_eq!(stage.tuning().rounds, 1);

        let mut integration = IntegrationStage::new();
        assert_eq!(integration.optimize(&[]).unwrap(), HookOutcome::Unsupported);
    }

    #[test]
    fn full_chain_runs() {
        let mut engine = AmplificationEngine::default();
        register_pipeline(&mut engine, &StageConfig::default());

        let encoded = into_record(json!({"strokes": [
            {"id": 0, "geometric": {"curvature": 0.0}, "topological": {"loops": [[0, 3]]}}
        ]}));
        let out = engine.multi_layer_amplify(&encoded, &PIPELINE_LAYERS).unwrap();
        assert!(out.contains_key("executable_code"));
        assert_eq!(engine.current_state().unwrap().target_layer.as_str(), "layer4");
    }
}
