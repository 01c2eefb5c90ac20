//! Evaluation harness: scores predicted questions against a labelled
//! benchmark and reconstructs a template baseline for comparison.

pub mod baseline;
pub mod dataset;
mod error;
pub mod harness;
pub mod metrics;
pub mod similarity;

pub use baseline::{baseline_from_signals, baseline_question, reconstruct_baseline};
pub use dataset::{Benchmark, Predictions};
pub use error::EvalError;
pub use harness::{
    Comparison, DEFAULT_SEMANTIC_THRESHOLD, EvalConfig, Evaluation, Evaluator, MetricReport,
};
pub use similarity::{SemanticSimilarity, TokenJaccard};
