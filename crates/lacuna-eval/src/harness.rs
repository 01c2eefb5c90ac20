//! Scores a prediction set against a benchmark.
//!
//! Per-question metrics (exact match, Jaccard, semantic similarity, semantic
//! match rate) divide by the number of predictions evaluated. Precision@1
//! divides by the number of papers evaluated. Papers in the benchmark with no
//! predictions are left out of every aggregate and reported in
//! [`Evaluation::skipped_papers`], so a partial run scores only what it
//! attempted.

use std::ops::AddAssign;

use lacuna_core::QuestionRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::baseline::reconstruct_baseline;
use crate::dataset::{Benchmark, Predictions};
use crate::error::EvalError;
use crate::metrics::{best_jaccard, exact_match_any};
use crate::similarity::{SemanticSimilarity, best_semantic_match};

pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.75;

// ── Config ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalConfig {
    /// Best semantic similarity at or above this counts as a match.
    pub semantic_threshold: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
        }
    }
}

impl EvalConfig {
    pub fn new(semantic_threshold: f64) -> Result<Self, EvalError> {
        let config = Self { semantic_threshold };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if !(0.0..=1.0).contains(&self.semantic_threshold) {
            return Err(EvalError::InvalidThreshold(self.semantic_threshold));
        }
        Ok(())
    }
}

// ── Report ──

/// Aggregate metrics for one prediction set. Every value is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReport {
    pub exact_match: f64,
    pub jaccard: f64,
    pub semantic_similarity: f64,
    pub semantic_match_rate: f64,
    pub precision_at_1: f64,
}

impl MetricReport {
    /// `(name, value)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("exact_match", self.exact_match),
            ("jaccard", self.jaccard),
            ("semantic_similarity", self.semantic_similarity),
            ("semantic_match_rate", self.semantic_match_rate),
            ("precision_at_1", self.precision_at_1),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub report: MetricReport,
    pub papers_evaluated: usize,
    pub predictions_evaluated: usize,
    /// Benchmarked papers with no predictions, excluded from every aggregate.
    pub skipped_papers: Vec<String>,
    /// Papers with predictions but no benchmark entry.
    pub unbenchmarked_papers: Vec<String>,
}

/// Primary predictions and the template baseline, scored the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub primary: Evaluation,
    pub baseline: Evaluation,
}

/// Running sums for one or more papers. Addition is order-independent, so
/// per-paper tallies can be merged in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    predictions: usize,
    papers: usize,
    exact: usize,
    jaccard: f64,
    semantic: f64,
    semantic_matches: usize,
    top_hits: usize,
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.predictions += rhs.predictions;
        self.papers += rhs.papers;
        self.exact += rhs.exact;
        self.jaccard += rhs.jaccard;
        self.semantic += rhs.semantic;
        self.semantic_matches += rhs.semantic_matches;
        self.top_hits += rhs.top_hits;
    }
}

impl Tally {
    fn report(&self) -> Option<MetricReport> {
        if self.predictions == 0 || self.papers == 0 {
            return None;
        }
        let per_question = self.predictions as f64;
        Some(MetricReport {
            exact_match: self.exact as f64 / per_question,
            jaccard: self.jaccard / per_question,
            semantic_similarity: self.semantic / per_question,
            semantic_match_rate: self.semantic_matches as f64 / per_question,
            precision_at_1: self.top_hits as f64 / self.papers as f64,
        })
    }
}

// ── Evaluator ──

pub struct Evaluator<S> {
    config: EvalConfig,
    similarity: S,
}

impl<S: SemanticSimilarity> Evaluator<S> {
    pub fn new(config: EvalConfig, similarity: S) -> Result<Self, EvalError> {
        config.validate()?;
        Ok(Self { config, similarity })
    }

    /// Score `predictions` against `benchmark`.
    ///
    /// Returns [`EvalError::NoPredictions`] when no benchmarked paper has a
    /// prediction.
    pub fn evaluate(
        &self,
        predictions: &Predictions,
        benchmark: &Benchmark,
    ) -> Result<Evaluation, EvalError> {
        let mut total = Tally::default();
        let mut skipped_papers = Vec::new();

        for paper_id in benchmark.paper_ids() {
            let ground_truths = benchmark.get(paper_id).unwrap_or_default();
            match predictions.get(paper_id) {
                Some(preds) if !preds.is_empty() => {
                    total += self.score_paper(paper_id, preds, ground_truths);
                }
                _ => skipped_papers.push(paper_id.to_string()),
            }
        }

        let unbenchmarked_papers: Vec<String> = predictions
            .iter()
            .map(|(paper_id, _)| paper_id)
            .filter(|paper_id| !benchmark.contains(paper_id))
            .map(str::to_string)
            .collect();

        if !skipped_papers.is_empty() {
            warn!(
                skipped = skipped_papers.len(),
                "benchmarked papers without predictions excluded from aggregates"
            );
        }
        if !unbenchmarked_papers.is_empty() {
            warn!(
                count = unbenchmarked_papers.len(),
                "predicted papers missing from benchmark"
            );
        }

        let report = total.report().ok_or(EvalError::NoPredictions {
            skipped_papers: skipped_papers.len(),
        })?;
        info!(
            papers = total.papers,
            predictions = total.predictions,
            exact_match = report.exact_match,
            precision_at_1 = report.precision_at_1,
            "evaluation complete"
        );

        Ok(Evaluation {
            report,
            papers_evaluated: total.papers,
            predictions_evaluated: total.predictions,
            skipped_papers,
            unbenchmarked_papers,
        })
    }

    /// Score the stored run and its reconstructed baseline.
    pub fn compare(
        &self,
        records: &[QuestionRecord],
        benchmark: &Benchmark,
    ) -> Result<Comparison, EvalError> {
        let primary = self.evaluate(&Predictions::from_records(records), benchmark)?;
        let baseline = self.evaluate(&reconstruct_baseline(records), benchmark)?;
        Ok(Comparison { primary, baseline })
    }

    fn score_paper(&self, paper_id: &str, preds: &[String], ground_truths: &[String]) -> Tally {
        let threshold = self.config.semantic_threshold;
        let mut tally = Tally {
            papers: 1,
            ..Tally::default()
        };

        for (rank, pred) in preds.iter().enumerate() {
            let semantic = best_semantic_match(&self.similarity, pred, ground_truths);
            tally.predictions += 1;
            if exact_match_any(pred, ground_truths) {
                tally.exact += 1;
            }
            tally.jaccard += best_jaccard(pred, ground_truths);
            tally.semantic += semantic;
            if semantic >= threshold {
                tally.semantic_matches += 1;
                if rank == 0 {
                    tally.top_hits = 1;
                }
            }
        }

        debug!(
            paper_id,
            predictions = tally.predictions,
            exact = tally.exact,
            top_hit = tally.top_hits == 1,
            "scored paper"
        );
        tally
    }
}
