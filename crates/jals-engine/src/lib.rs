//! # jals-engine
//!
//! JALS Amplification Engine: a registry of pluggable transformers that
//! move records between named layers, with an append-only operation log,
//! quality reporting on the last forward step, pattern-driven tuning of
//! transformers, and JSON state persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   AmplificationEngine                         │
//! │                                                               │
//! │  (source, target, direction) ──→ TransformerKey               │
//! │                                       │                       │
//! │                                       ▼                       │
//! │                             TransformerRegistry               │
//! │                                       │                       │
//! │                                       ▼                       │
//! │          Record ──→ Transformer::transform ──→ Record         │
//! │                                       │                       │
//! │                  ┌────────────────────┼─────────────┐         │
//! │                  ▼                    ▼             ▼         │
//! │             CurrentState        History log    QualityScorer  │
//! │            (forward only)            │                        │
//! │                                      ▼                        │
//! │                          analyze_operation_patterns           │
//! │                                      │                        │
//! │                                      ▼                        │
//! │                         Transformer::optimize hooks           │
//! │                                                               │
//! │  StatePersistence: config + history + current_state           │
//! │                    + transformer_configs                      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Decisions
//!
//! - **Exact key lookup**: no fallback between forward and reverse names
//! - **No rollback**: a failed chain step leaves earlier steps logged
//! - **Capabilities, not probing**: optional transformer hooks answer
//!   with `None` / `HookOutcome::Unsupported`
//! - **Single lock**: `SharedEngine` serializes whole engine calls

#![deny(unsafe_code)]

pub mod builtin;
pub mod engine;
pub mod error;
pub mod patterns;
pub mod persistence;
pub mod quality;
pub mod registry;
pub mod shared;
pub mod transformer;

// ── Re-exports ───────────────────────────────────────────────────────

pub use builtin::{StrokesToSymbols, SymbolsToLinguistic, DEFAULT_CLOSURE_TOLERANCE};
pub use engine::AmplificationEngine;
pub use error::{AmplifyError, AmplifyResult, ErrorKind, TransformError, TransformResult};
pub use patterns::analyze_operation_patterns;
pub use persistence::{InMemoryState, JsonFileState, StatePersistence};
pub use quality::{FixedQualityScorer, QualityScorer};
pub use registry::TransformerRegistry;
pub use shared::SharedEngine;
pub use transformer::{FnTransformer, HookOutcome, Transformer, TuningState};
