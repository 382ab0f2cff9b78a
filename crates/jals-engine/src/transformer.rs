//! The transformer contract.
//!
//! A transformer is a named, side-effect-free function from one record to
//! another. Two capabilities are optional: exposing a configuration (used
//! when saving engine state) and accepting optimization hints (used by
//! `optimize_transformations`). Unsupported capabilities answer with a
//! sentinel (`None`, `HookOutcome::Unsupported`) instead of being probed.

use jals_types::{OperationPattern, Record};

use crate::error::TransformResult;

// ── Transformer Trait ────────────────────────────────────────────────

/// Outcome of an optional hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// The transformer handled the hook.
    Applied,
    /// The transformer does not implement the hook.
    Unsupported,
}

/// A pluggable record-to-record transformation.
pub trait Transformer: Send + Sync {
    /// Name of this transformer implementation.
    fn name(&self) -> &str;

    /// Transform an input record into an output record.
    fn transform(&self, input: &Record) -> TransformResult<Record>;

    /// The transformer's declared configuration, if it exposes one.
    fn config(&self) -> Option<Record> {
        None
    }

    /// Adjust internal tuning from observed operation patterns.
    fn optimize(&mut self, _patterns: &[OperationPattern]) -> TransformResult<HookOutcome> {
        Ok(HookOutcome::Unsupported)
    }
}

// ── Tuning State ─────────────────────────────────────────────────────

/// Tuning state kept by transformers that accept optimization hints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TuningState {
    /// Number of optimization rounds received.
    pub rounds: usize,
    /// Patterns from the most recent round.
    pub last_patterns: Vec<OperationPattern>,
}

impl TuningState {
    /// Record one optimization round.
    pub fn absorb(&mut self, patterns: &[OperationPattern]) {
        self.rounds += 1;
        self.last_patterns = patterns.to_vec();
    }
}

// ── Closure Transformer ──────────────────────────────────────────────

/// A transformer backed by a closure.
pub struct FnTransformer<F> {
    name: String,
    config: Option<Record>,
    func: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&Record) -> TransformResult<Record> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            config: None,
            func,
        }
    }

    /// Expose `config` through the configuration capability.
    pub fn with_config(mut self, config: Record) -> Self {
        self.config = Some(config);
        self
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&Record) -> TransformResult<Record> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, input: &Record) -> TransformResult<Record> {
        (self.func)(input)
    }

    fn config(&self) -> Option<Record> {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use serde_json::json;

    #[test]
    fn closure_transformer_applies_function() {
        let t = FnTransformer::new("upper", |input: &Record| {
            let mut out = input.clone();
            out.insert("seen".into(), json!(true));
            Ok(out)
        });
        let out = t.transform(&Record::new()).unwrap();
        assert_eq!(out["seen"], json!(true));
        assert_eq!(t.name(), "upper");
    }

    #[test]
    fn optional_capabilities_default_to_unsupported() {
        let mut t = FnTransformer::new("plain", |input: &Record| Ok(input.clone()));
        assert!(t.config().is_none());
        assert_eq!(t.optimize(&[]).unwrap(), HookOutcome::Unsupported);
    }

    #[test]
    fn closure_transformer_config_capability() {
        let mut cfg = Record::new();
        cfg.insert("threshold".into(), json!(0.3));
        let t = FnTransformer::new("cfg", |input: &Record| Ok(input.clone())).with_config(cfg);
        assert_eq!(t.config().unwrap()["threshold"], json!(0.3));
    }

    #[test]
    fn closure_errors_surface() {
        let t = FnTransformer::new("broken", |_: &Record| {
            Err(TransformError::Failed("boom".into()))
        });
        assert!(t.transform(&Record::new()).is_err());
    }

    #[test]
    fn tuning_state_tracks_rounds() {
        let mut tuning = TuningState::default();
        tuning.absorb(&[OperationPattern::frequency("amplify", 2)]);
        tuning.absorb(&[]);
        assert_eq!(tuning.rounds, 2);
        assert!(tuning.last_patterns.is_empty());
    }

    #[test]
    fn transformer_trait_object() {
        let t: Box<dyn Transformer> =
            Box::new(FnTransformer::new("boxed", |input: &Record| Ok(input.clone())));
        assert_eq!(t.name(), "boxed");
    }
}
