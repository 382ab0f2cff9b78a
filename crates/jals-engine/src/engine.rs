//! Central amplification engine.
//!
//! The `AmplificationEngine` owns the transformer registry, the append-only
//! operation history, and the snapshot of the last forward step. Every
//! lookup goes through a derived `TransformerKey`:
//! layers → key → registry → transformer → record.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;
use tracing::debug;

use jals_types::{
    into_record, record_size, CurrentState, EngineConfig, HistoryEntry, LayerId, OperationKind,
    OperationPattern, PersistedState, QualityMetrics, Record, TransformationQuality,
    TransformerKey,
};

use crate::builtin::{StrokesToSymbols, SymbolsToLinguistic};
use crate::error::{AmplifyError, AmplifyResult};
use crate::patterns::analyze_operation_patterns;
use crate::persistence::{JsonFileState, StatePersistence};
use crate::quality::{FixedQualityScorer, QualityScorer};
use crate::registry::TransformerRegistry;
use crate::transformer::{HookOutcome, Transformer};

/// Orchestrates registered transformers across named layers.
pub struct AmplificationEngine {
    /// Engine configuration (persisted with state).
    config: EngineConfig,
    /// Registered transformers.
    registry: TransformerRegistry,
    /// Every logged operation, oldest first.
    history: Vec<HistoryEntry>,
    /// Snapshot of the most recent forward step.
    current_state: Option<CurrentState>,
    /// Produces the four quality scores.
    scorer: Box<dyn QualityScorer>,
    /// Transformer configs read by the last `load_state`.
    restored_configs: BTreeMap<String, Record>,
}

impl AmplificationEngine {
    /// Create an engine with an empty registry and the fixed scorer.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: TransformerRegistry::new(),
            history: Vec::new(),
            current_state: None,
            scorer: Box::new(FixedQualityScorer::new()),
            restored_configs: BTreeMap::new(),
        }
    }

    /// Create an engine with both built-in transformers registered.
    pub fn with_builtins(config: EngineConfig) -> Self {
        let mut engine = Self::new(config);
        engine.register_transformer(StrokesToSymbols::NAME, Box::new(StrokesToSymbols::new()));
        engine.register_transformer(
            SymbolsToLinguistic::NAME,
            Box::new(SymbolsToLinguistic::new()),
        );
        engine
    }

    /// Replace the quality scorer.
    pub fn with_scorer(mut self, scorer: Box<dyn QualityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Register `transformer` under `name`, replacing any previous one.
    pub fn register_transformer(
        &mut self,
        name: impl Into<String>,
        transformer: Box<dyn Transformer>,
    ) {
        let name = name.into();
        debug!(name = %name, transformer = transformer.name(), "registering transformer");

        self.registry.insert(name.clone(), transformer);
        self.log_operation(
            OperationKind::RegisterTransformer,
            into_record(json!({ "name": name })),
        );
    }

    /// Register `transformer` under the name derived from `key`.
    pub fn register_for(&mut self, key: &TransformerKey, transformer: Box<dyn Transformer>) {
        self.register_transformer(key.name(), transformer);
    }

    // ── Amplification ────────────────────────────────────────────────

    /// Run the forward transformer from `source` to `target`.
    ///
    /// On success the current-state snapshot is overwritten and an
    /// `amplify` entry is appended. Nothing changes on failure.
    pub fn amplify(
        &mut self,
        input: &Record,
        source: impl Into<LayerId>,
        target: impl Into<LayerId>,
    ) -> AmplifyResult<Record> {
        let key = TransformerKey::forward(source, target);
        let output = self.run_step(&key, input)?;

        self.current_state = Some(CurrentState {
            source_layer: key.source.clone(),
            target_layer: key.target.clone(),
            input_data: input.clone(),
            output_data: output.clone(),
        });
        self.log_operation(OperationKind::Amplify, Self::step_params(&key, input));

        Ok(output)
    }

    /// Run the reverse transformer from `source` to `target`.
    ///
    /// Appends a `reverse_amplify` entry; the current-state snapshot is
    /// left untouched.
    pub fn reverse_amplify(
        &mut self,
        input: &Record,
        source: impl Into<LayerId>,
        target: impl Into<LayerId>,
    ) -> AmplifyResult<Record> {
        let key = TransformerKey::reverse(source, target);
        let output = self.run_step(&key, input)?;

        self.log_operation(OperationKind::ReverseAmplify, Self::step_params(&key, input));
        Ok(output)
    }

    /// Amplify through each adjacent pair of `layers` in order.
    ///
    /// Fewer than two layers returns `input` unchanged without any lookup.
    /// The first failing step aborts the chain; earlier steps stay logged.
    pub fn multi_layer_amplify<S: AsRef<str>>(
        &mut self,
        input: &Record,
        layers: &[S],
    ) -> AmplifyResult<Record> {
        let mut current = input.clone();
        for pair in layers.windows(2) {
            current = self.amplify(&current, pair[0].as_ref(), pair[1].as_ref())?;
        }
        Ok(current)
    }

    /// Reverse-amplify through each adjacent pair of `layers` in order.
    pub fn multi_layer_reverse_amplify<S: AsRef<str>>(
        &mut self,
        input: &Record,
        layers: &[S],
    ) -> AmplifyResult<Record> {
        let mut current = input.clone();
        for pair in layers.windows(2) {
            current = self.reverse_amplify(&current, pair[0].as_ref(), pair[1].as_ref())?;
        }
        Ok(current)
    }

    fn run_step(&self, key: &TransformerKey, input: &Record) -> AmplifyResult<Record> {
        let transformer = self.registry.resolve(key)?;
        debug!(key = %key, transformer = transformer.name(), "running transformer");
        Ok(transformer.transform(input)?)
    }

    fn step_params(key: &TransformerKey, input: &Record) -> Record {
        into_record(json!({
            "source_layer": key.source,
            "target_layer": key.target,
            "data_size": record_size(input),
        }))
    }

    // ── Quality & Optimization ───────────────────────────────────────

    /// Quality of the last forward step, or a zero score if there is none.
    pub fn get_transformation_quality(&self) -> TransformationQuality {
        match &self.current_state {
            None => TransformationQuality::unscored(),
            Some(state) => TransformationQuality::Scored(QualityMetrics::from_components(
                self.scorer.score(state),
            )),
        }
    }

    /// Analyze the history and hand the patterns to every transformer
    /// that accepts optimization hints.
    ///
    /// A failing hook aborts the pass; transformers already tuned keep
    /// their new state and no history entry is written.
    pub fn optimize_transformations(&mut self) -> AmplifyResult<Vec<OperationPattern>> {
        let patterns = analyze_operation_patterns(&self.history);

        let mut tuned = 0usize;
        for (name, transformer) in self.registry.entries_mut() {
            match transformer.optimize(&patterns)? {
                HookOutcome::Applied => {
                    debug!(name = %name, "transformer tuned");
                    tuned += 1;
                }
                HookOutcome::Unsupported => {}
            }
        }

        debug!(patterns = patterns.len(), tuned, "optimization pass complete");
        self.log_operation(
            OperationKind::OptimizeTransformations,
            into_record(json!({ "patterns_found": patterns.len() })),
        );
        Ok(patterns)
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// The full state document as it would be saved.
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            config: self.config.clone(),
            history: self.history.clone(),
            current_state: self.current_state.clone(),
            transformer_configs: self.registry.configs(),
        }
    }

    /// Write the state document to `path` as indented JSON.
    pub fn save_state(&self, path: impl AsRef<Path>) -> AmplifyResult<()> {
        let store = JsonFileState::new(path.as_ref()).with_atomic_writes(self.config.atomic_writes);
        self.save_to(&store)
    }

    /// Write the state document through any persistence backend.
    pub fn save_to(&self, store: &dyn StatePersistence) -> AmplifyResult<()> {
        store.save(&self.snapshot())
    }

    /// Replace config, history and current state from the file at `path`.
    ///
    /// Registered transformers are kept as they are.
    pub fn load_state(&mut self, path: impl AsRef<Path>) -> AmplifyResult<()> {
        self.load_from(&JsonFileState::new(path.as_ref()))
    }

    /// Replace config, history and current state from any backend.
    pub fn load_from(&mut self, store: &dyn StatePersistence) -> AmplifyResult<()> {
        let state = store.load()?;
        debug!(
            history = state.history.len(),
            has_current = state.current_state.is_some(),
            "restoring engine state"
        );

        self.config = state.config;
        self.history = state.history;
        self.current_state = state.current_state;
        self.restored_configs = state.transformer_configs;
        Ok(())
    }

    /// Transformer configs read by the last load, keyed by registry name.
    pub fn restored_transformer_configs(&self) -> &BTreeMap<String, Record> {
        &self.restored_configs
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn current_state(&self) -> Option<&CurrentState> {
        self.current_state.as_ref()
    }

    /// The last forward snapshot, or `MissingState` if there is none.
    pub fn require_current_state(&self) -> AmplifyResult<&CurrentState> {
        self.current_state
            .as_ref()
            .ok_or_else(|| AmplifyError::MissingState("no forward amplification has run".into()))
    }

    /// Output of the last forward step.
    pub fn last_output(&self) -> AmplifyResult<&Record> {
        self.require_current_state().map(|s| &s.output_data)
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// Name of the active quality scorer.
    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    fn log_operation(&mut self, kind: OperationKind, params: Record) {
        self.history.push(HistoryEntry::new(kind, params));
    }
}

impl Default for AmplificationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for AmplificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmplificationEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("history_len", &self.history.len())
            .field("has_current_state", &self.current_state.is_some())
            .field("scorer", &self.scorer.name())
            .finish()
    }
}
