//! Property tests: chaining is step-by-step amplification, and history
//! grows by exactly one entry per successful step.

use jals_engine::{AmplificationEngine, FnTransformer};
use jals_types::{into_record, OperationKind, Record};
use proptest::prelude::*;
use serde_json::json;

const LAYERS: [&str; 5] = ["l0", "l1", "l2", "l3", "l4"];

/// Engine with deterministic forward transformers between every pair of
/// adjacent layers in `LAYERS`.
fn chained_engine() -> AmplificationEngine {
    let mut engine = AmplificationEngine::default();
    for pair in LAYERS.windows(2) {
        let step = format!("{}>{}", pair[0], pair[1]);
        engine.register_transformer(
            format!("{}_to_{}", pair[0], pair[1]),
            Box::new(FnTransformer::new(step.clone(), move |input: &Record| {
                let mut out = input.clone();
                let n = out.get("n").and_then(|v| v.as_i64()).unwrap_or(0);
                out.insert("n".into(), json!(n * 3 + 1));
                out.insert("last".into(), json!(step));
                Ok(out)
            })),
        );
    }
    engine
}

fn arb_input() -> impl Strategy<Value = Record> {
    (-1000i64..1000, "[a-z]{0,12}")
        .prop_map(|(n, tag)| into_record(json!({"n": n, "tag": tag})))
}

proptest! {
    /// A chain over `[A, B, C]` equals amplifying A→B then B→C by hand.
    #[test]
    fn chain_equals_manual_steps(input in arb_input(), start in 0usize..3) {
        let layers = &LAYERS[start..start + 3];

        let mut chained = chained_engine();
        let via_chain = chained.multi_layer_amplify(&input, layers).unwrap();

        let mut manual = chained_engine();
        let mid = manual.amplify(&input, layers[0], layers[1]).unwrap();
        let via_steps = manual.amplify(&mid, layers[1], layers[2]).unwrap();

        prop_assert_eq!(&via_chain, &via_steps);
        prop_assert_eq!(chained.current_state(), manual.current_state());
    }

    /// Each successful step appends exactly one `amplify` entry.
    #[test]
    fn history_grows_by_step_count(input in arb_input(), len in 0usize..=5) {
        let mut engine = chained_engine();
        let before = engine.history().len();

        engine.multi_layer_amplify(&input, &LAYERS[..len]).unwrap();

        let steps = len.saturating_sub(1);
        prop_assert_eq!(engine.history().len(), before + steps);
        prop_assert!(engine.history()[before..].iter().all(|h| h.is(OperationKind::Amplify)));
    }

    /// A single-layer chain is the identity.
    #[test]
    fn single_layer_chain_is_identity(input in arb_input(), idx in 0usize..5) {
        let mut engine = chained_engine();
        let out = engine.multi_layer_amplify(&input, &LAYERS[idx..=idx]).unwrap();
        prop_assert_eq!(out, input);
        prop_assert!(engine.current_state().is_none());
    }
}
