//! End-to-end extraction: detect and score, cap per paper, generate, rank.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use lacuna_core::{Policy, PolicyError, Question, QuestionRanker, Signal, SignalExtractor, TextUnit};
use tracing::info;

use crate::extractor::{GenerationStats, extract_questions};
use crate::generator::QuestionGenerator;

/// Default per-call generation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound on a single generation call.
    pub timeout: Duration,
    /// Papers whose generation calls may be in flight at once.
    pub concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: 1,
        }
    }
}

/// Stage counts plus the final ranked questions.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub units: usize,
    pub signals_retained: usize,
    pub signals_advanced: usize,
    pub generation: GenerationStats,
    pub questions: Vec<Question>,
}

pub struct Pipeline {
    extractor: SignalExtractor,
    ranker: QuestionRanker,
    options: PipelineOptions,
}

impl Pipeline {
    /// Fails on an invalid policy or a zero `concurrency`.
    pub fn new(policy: Policy, options: PipelineOptions) -> Result<Self, PolicyError> {
        if options.concurrency == 0 {
            return Err(PolicyError::ZeroCap { name: "concurrency" });
        }
        let ranker = QuestionRanker::from_policy(&policy)?;
        let extractor = SignalExtractor::new(policy)?;
        Ok(Self {
            extractor,
            ranker,
            options,
        })
    }

    /// Run every stage over `units`, which arrive grouped in paper order.
    ///
    /// Generation runs per paper, up to `concurrency` papers at once. Results
    /// are merged back in paper order before the single global ranking step.
    pub async fn run<G: QuestionGenerator + ?Sized>(
        &self,
        units: &[TextUnit],
        generator: &G,
    ) -> PipelineReport {
        let signals = self.extractor.extract(units);
        let signals_retained = signals.len();

        let advanced = self.ranker.select_per_source(signals);
        let signals_advanced = advanced.len();

        let batches = paper_batches(advanced);
        let timeout = self.options.timeout;
        let per_paper: Vec<(Vec<Question>, GenerationStats)> = stream::iter(batches)
            .map(|(first_id, batch)| async move {
                extract_questions(&batch, first_id, generator, timeout).await
            })
            .buffered(self.options.concurrency)
            .collect()
            .await;

        let mut generation = GenerationStats::default();
        let mut candidates = Vec::new();
        for (questions, stats) in per_paper {
            generation += stats;
            candidates.extend(questions);
        }

        let questions = self.ranker.rank(candidates);
        info!(
            units = units.len(),
            signals_retained,
            signals_advanced,
            generated = generation.generated,
            kept = questions.len(),
            "pipeline complete"
        );

        PipelineReport {
            units: units.len(),
            signals_retained,
            signals_advanced,
            generation,
            questions,
        }
    }
}

/// Build a [`Pipeline`] for `policy` and run it once.
pub async fn run_pipeline<G: QuestionGenerator + ?Sized>(
    units: &[TextUnit],
    policy: Policy,
    generator: &G,
    options: PipelineOptions,
) -> Result<PipelineReport, PolicyError> {
    Ok(Pipeline::new(policy, options)?.run(units, generator).await)
}

/// Split advanced signals into per-paper batches, each tagged with the
/// 1-based id of its first signal in the advanced list.
fn paper_batches(signals: Vec<Signal>) -> Vec<(u32, Vec<Signal>)> {
    let mut grouped: IndexMap<String, (u32, Vec<Signal>)> = IndexMap::new();
    for (idx, signal) in signals.into_iter().enumerate() {
        let id = idx as u32 + 1;
        grouped
            .entry(signal.paper_id.clone())
            .or_insert_with(|| (id, Vec::new()))
            .1
            .push(signal);
    }
    grouped.into_values().collect()
}
