//! Integration tests: registration, amplification, quality and persistence
//! through the public engine API.

use jals_engine::{
    AmplificationEngine, AmplifyError, ErrorKind, FnTransformer, StrokesToSymbols, Transformer,
};
use jals_types::{
    into_record, EngineConfig, OperationKind, Record, TransformationQuality, TransformerKey,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stroke_input() -> Record {
    into_record(json!({"strokes": [{"id": 1, "points": [[0, 0], [1, 1]]}]}))
}

fn counter(label: &'static str) -> Box<dyn Transformer> {
    Box::new(FnTransformer::new(label, move |input: &Record| {
        let mut out = input.clone();
        let hits = out.get(label).and_then(|v| v.as_u64()).unwrap_or(0);
        out.insert(label.into(), json!(hits + 1));
        Ok(out)
    }))
}

// ---------------------------------------------------------------------------
// Amplification
// ---------------------------------------------------------------------------

#[test]
fn stroke_example_through_engine() {
    let mut engine = AmplificationEngine::new(EngineConfig::default());
    engine.register_transformer("layer1_to_layer2", Box::new(StrokesToSymbols::new()));

    let out = engine.amplify(&stroke_input(), "layer1", "layer2").unwrap();

    assert!(out.contains_key("symbols"));
    assert!(out.contains_key("transformation_info"));
    assert_eq!(engine.history().last().unwrap().operation, "amplify");
}

#[test]
fn registered_name_must_match_derived_key_exactly() {
    let mut engine = AmplificationEngine::default();
    engine.register_transformer("Layer1_to_layer2", counter("x"));
    engine.register_transformer("layer1-to-layer2", counter("y"));

    let err = engine.amplify(&Record::new(), "layer1", "layer2").unwrap_err();
    assert!(matches!(err, AmplifyError::NotFound(_)));

    engine.register_for(&TransformerKey::forward("layer1", "layer2"), counter("z"));
    let out = engine.amplify(&Record::new(), "layer1", "layer2").unwrap();
    assert_eq!(out["z"], json!(1));
}

#[test]
fn not_found_leaves_history_length_unchanged() {
    let mut engine = AmplificationEngine::with_builtins(EngineConfig::default());
    let before = engine.history().len();

    for (source, target) in [("layer3", "layer4"), ("layer2", "layer1")] {
        let err = engine.amplify(&Record::new(), source, target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    let err = engine
        .reverse_amplify(&Record::new(), "layer2", "layer1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(engine.history().len(), before);
}

#[test]
fn forward_sets_state_and_reverse_does_not() {
    let mut engine = AmplificationEngine::default();
    engine.register_transformer("a_to_b", counter("fwd"));
    engine.register_transformer("b_to_a_reverse", counter("rev"));

    let input = into_record(json!({"seed": true}));
    let out = engine.amplify(&input, "a", "b").unwrap();
    let state = engine.current_state().unwrap().clone();
    assert_eq!(state.input_data, input);
    assert_eq!(state.output_data, out);

    engine.reverse_amplify(&out, "b", "a").unwrap();
    assert_eq!(engine.current_state(), Some(&state));
}

#[test]
fn repeated_registration_replaces_transformer() {
    let mut engine = AmplificationEngine::default();
    engine.register_transformer("a_to_b", counter("first"));
    engine.register_transformer("a_to_b", counter("second"));

    let out = engine.amplify(&Record::new(), "a", "b").unwrap();
    assert!(!out.contains_key("first"));
    assert_eq!(out["second"], json!(1));

    let registrations = engine
        .history()
        .iter()
        .filter(|h| h.is(OperationKind::RegisterTransformer))
        .count();
    assert_eq!(registrations, 2);
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

#[test]
fn quality_shapes() {
    let mut engine = AmplificationEngine::default();
    let before = engine.get_transformation_quality();
    assert_eq!(before, TransformationQuality::unscored());
    assert_eq!(before.to_record(), into_record(json!({"quality_score": 0.0})));

    engine.register_transformer("a_to_b", counter("fwd"));
    engine.amplify(&Record::new(), "a", "b").unwrap();

    let record = engine.get_transformation_quality().to_record();
    assert_eq!(record.len(), 5);
    let mean = ["fidelity", "coherence", "completeness", "efficiency"]
        .iter()
        .map(|k| record[*k].as_f64().unwrap())
        .sum::<f64>()
        / 4.0;
    assert!((record["overall_quality"].as_f64().unwrap() - mean).abs() < 1e-12);
}

#[test]
fn reverse_only_engine_stays_unscored() {
    let mut engine = AmplificationEngine::default();
    engine.register_transformer("b_to_a_reverse", counter("rev"));
    engine.reverse_amplify(&Record::new(), "b", "a").unwrap();
    assert!(!engine.get_transformation_quality().is_scored());
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn save_load_roundtrip_preserves_config_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");

    let mut engine =
        AmplificationEngine::with_builtins(EngineConfig::named("roundtrip").with_setting("k", 3));
    engine.amplify(&stroke_input(), "layer1", "layer2").unwrap();
    engine.optimize_transformations().unwrap();
    engine.save_state(&path).unwrap();

    let mut restored = AmplificationEngine::default();
    restored.load_state(&path).unwrap();

    assert_eq!(restored.config(), engine.config());
    assert_eq!(restored.history(), engine.history());
    assert_eq!(restored.current_state(), engine.current_state());
    assert!(restored.get_transformation_quality().is_scored());

    let configs = restored.restored_transformer_configs();
    assert!(configs.contains_key("layer1_to_layer2"));
    assert!(configs.contains_key("layer2_to_layer3"));
}

#[test]
fn save_load_roundtrip_preserves_float_settings_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");

    let floats: Vec<f64> = (1..400)
        .map(|i| {
            let i = i as f64;
            match i as u64 % 4 {
                0 => i / 7.0,
                1 => 1.0 / (i * 3.0),
                2 => (i * 0.1).sin() * 1e-5,
                _ => i.sqrt() * 123_456.789,
            }
        })
        .collect();

    let mut config = EngineConfig::named("floats");
    for (i, v) in floats.iter().enumerate() {
        config = config.with_setting(format!("rate_{}", i), *v);
    }

    let mut engine = AmplificationEngine::new(config);
    engine.register_transformer(
        "layer1_to_layer2",
        Box::new(FnTransformer::new("echo", |input: &Record| Ok(input.clone()))),
    );
    let points: Vec<[f64; 2]> = floats
        .chunks(2)
        .filter_map(|c| Some([c[0], *c.get(1)?]))
        .collect();
    let input = into_record(json!({"strokes": [{"id": "s", "points": points}]}));
    engine.amplify(&input, "layer1", "layer2").unwrap();
    engine.save_state(&path).unwrap();

    let mut restored = AmplificationEngine::default();
    restored.load_state(&path).unwrap();

    assert_eq!(restored.config(), engine.config());
    assert_eq!(restored.current_state(), engine.current_state());
    assert_eq!(restored.last_output().unwrap(), &input);
}

#[test]
fn saved_document_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");

    let mut engine = AmplificationEngine::default();
    engine.register_transformer("plain_to_other", counter("p"));
    engine.save_state(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(raw.contains('\n'));
    assert!(doc["current_state"].is_null());
    assert_eq!(doc["transformer_configs"], json!({}));
    assert_eq!(doc["history"][0]["operation"], json!("register_transformer"));
    assert_eq!(doc["history"][0]["params"]["name"], json!("plain_to_other"));
    assert!(doc["config"]["name"].is_string());
}

#[test]
fn load_does_not_touch_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");
    AmplificationEngine::default().save_state(&path).unwrap();

    let mut engine = AmplificationEngine::default();
    engine.register_transformer("a_to_b", counter("a"));
    engine.load_state(&path).unwrap();

    assert!(engine.history().is_empty());
    assert!(engine.registry().contains("a_to_b"));
    assert!(engine.amplify(&Record::new(), "a", "b").is_ok());
}

#[test]
fn load_accepts_partial_and_naive_timestamp_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{
            "history": [
                {"operation": "amplify", "timestamp": "2024-03-01T12:30:00.123456",
                 "params": {"source_layer": "layer1", "target_layer": "layer2", "data_size": 10}}
            ]
        }"#,
    )
    .unwrap();

    let mut engine = AmplificationEngine::default();
    engine.load_state(&path).unwrap();
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.config(), &EngineConfig::default());
    assert!(engine.current_state().is_none());
}

#[test]
fn load_missing_file_fails_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = AmplificationEngine::default();
    engine.register_transformer("a_to_b", counter("a"));

    let err = engine.load_state(dir.path().join("nope.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    assert_eq!(engine.history().len(), 1);
}
