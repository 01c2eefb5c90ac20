//! `lacuna evaluate`: score a stored run and its baseline against a benchmark.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use lacuna_ai::{EmbeddingTable, OllamaClient};
use lacuna_core::QuestionRecord;
use lacuna_eval::{
    Benchmark, Comparison, EvalConfig, Evaluator, Predictions, SemanticSimilarity, TokenJaccard,
    reconstruct_baseline,
};
use tracing::info;

/// Backing function for the semantic metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SimilarityKind {
    /// Cosine similarity of Ollama embeddings.
    Embedding,
    /// Token Jaccard; needs no model.
    Jaccard,
}

impl SimilarityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::Jaccard => "jaccard",
        }
    }
}

pub struct EmbeddingSettings<'a> {
    pub ollama_url: &'a str,
    pub embed_model: &'a str,
}

pub async fn run_evaluation(
    benchmark_path: &Path,
    results_path: &Path,
    config: EvalConfig,
    kind: SimilarityKind,
    embedding: EmbeddingSettings<'_>,
) -> anyhow::Result<Comparison> {
    let benchmark = Benchmark::load(benchmark_path)
        .with_context(|| format!("loading benchmark {}", benchmark_path.display()))?;
    let records = lacuna_core::read_results(results_path)
        .with_context(|| format!("loading results {}", results_path.display()))?;
    info!(
        records = records.len(),
        papers = benchmark.len(),
        similarity = kind.as_str(),
        "evaluating"
    );

    match kind {
        SimilarityKind::Jaccard => compare(config, TokenJaccard, &records, &benchmark),
        SimilarityKind::Embedding => {
            let client = OllamaClient::new(embedding.ollama_url, lacuna_ai::DEFAULT_MODEL)
                .with_embed_model(embedding.embed_model);
            let texts = texts_to_embed(&records, &benchmark);
            let table = EmbeddingTable::build(&client, texts.iter().map(String::as_str))
                .await
                .context("computing embeddings")?;
            compare(
                config,
                |a: &str, b: &str| table.similarity(a, b),
                &records,
                &benchmark,
            )
        }
    }
}

fn compare<S: SemanticSimilarity>(
    config: EvalConfig,
    similarity: S,
    records: &[QuestionRecord],
    benchmark: &Benchmark,
) -> anyhow::Result<Comparison> {
    let evaluator = Evaluator::new(config, similarity)?;
    Ok(evaluator.compare(records, benchmark)?)
}

/// Every string a similarity call can see: predictions, baseline questions
/// and ground truths of benchmarked papers.
fn texts_to_embed(records: &[QuestionRecord], benchmark: &Benchmark) -> Vec<String> {
    let primary = Predictions::from_records(records);
    let baseline = reconstruct_baseline(records);
    let mut texts = Vec::new();
    for predictions in [&primary, &baseline] {
        for (paper_id, questions) in predictions.iter() {
            if benchmark.contains(paper_id) {
                texts.extend(questions.iter().cloned());
            }
        }
    }
    for paper_id in benchmark.paper_ids() {
        if predictions_exist(&primary, paper_id) {
            texts.extend(benchmark.get(paper_id).unwrap_or_default().iter().cloned());
        }
    }
    texts
}

fn predictions_exist(predictions: &Predictions, paper_id: &str) -> bool {
    predictions.get(paper_id).is_some_and(|p| !p.is_empty())
}
