mod contract;
mod display;
mod evaluate;
mod ingest;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use lacuna_ai::{OllamaClient, Pipeline, PipelineOptions};
use lacuna_core::{Policy, SignalExtractor};
use lacuna_eval::EvalConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::evaluate::{EmbeddingSettings, SimilarityKind};

#[derive(Parser)]
#[command(
    name = "lacuna",
    version,
    about = "Extract unanswered research questions from a set of papers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect signals, generate questions and print the ranked result
    Extract {
        /// Paths to plain-text papers (at least 3)
        #[arg(long, num_args = 1.., required = true)]
        papers: Vec<PathBuf>,
        /// Maximum number of questions to return (at most 5)
        #[arg(long, default_value_t = 3)]
        max_questions: usize,
        /// Signals per paper sent to generation (default from policy)
        #[arg(long)]
        per_source_cap: Option<usize>,
        /// TOML policy overlay
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Ollama generation model
        #[arg(long, default_value = lacuna_ai::DEFAULT_MODEL)]
        model: String,
        /// Ollama server URL
        #[arg(long, env = "OLLAMA_URL", default_value = lacuna_ai::DEFAULT_BASE_URL)]
        ollama_url: String,
        /// Per-call generation timeout in seconds
        #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: u64,
        /// Papers generated concurrently
        #[arg(long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        concurrency: usize,
        /// Structured results file, overwritten on each run
        #[arg(long, default_value = "outputs/latest_results.json")]
        results: PathBuf,
        /// Write rendered output here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show every retained signal with its score breakdown (no generation)
    Signals {
        /// Paths to plain-text papers (at least 3)
        #[arg(long, num_args = 1.., required = true)]
        papers: Vec<PathBuf>,
        /// TOML policy overlay
        #[arg(long)]
        policy: Option<PathBuf>,
    },
    /// Score a stored run and its template baseline against a benchmark
    Evaluate {
        /// Benchmark CSV with paper_id and ground_truth_question columns
        #[arg(long, default_value = "evaluation/benchmark.csv")]
        benchmark: PathBuf,
        /// Results file written by `extract`
        #[arg(long, default_value = "outputs/latest_results.json")]
        results: PathBuf,
        /// Semantic match threshold in [0, 1]
        #[arg(long, default_value_t = lacuna_eval::DEFAULT_SEMANTIC_THRESHOLD)]
        threshold: f64,
        /// Similarity backing the semantic metrics
        #[arg(long, value_enum, default_value_t = SimilarityKind::Embedding)]
        similarity: SimilarityKind,
        /// Ollama embedding model
        #[arg(long, default_value = lacuna_ai::DEFAULT_EMBED_MODEL)]
        embed_model: String,
        /// Ollama server URL
        #[arg(long, env = "OLLAMA_URL", default_value = lacuna_ai::DEFAULT_BASE_URL)]
        ollama_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            papers,
            max_questions,
            per_source_cap,
            policy,
            model,
            ollama_url,
            timeout_secs,
            concurrency,
            results,
            output,
        } => {
            let input = match contract::validate_inputs(&papers, max_questions) {
                Ok(input) => input,
                Err(refusal) => {
                    info!(code = refusal.code(), "request refused");
                    println!("{refusal}");
                    return Ok(ExitCode::FAILURE);
                }
            };

            let policy = load_policy(policy.as_deref())?;
            let per_source_cap = per_source_cap.unwrap_or(policy.per_source_cap);
            let policy = policy
                .with_caps(per_source_cap, input.max_questions)
                .context("applying question caps")?;

            let units = ingest::load_papers(&input.papers)?;
            let pipeline = Pipeline::new(
                policy,
                PipelineOptions {
                    timeout: Duration::from_secs(timeout_secs),
                    concurrency,
                },
            )?;
            let client = OllamaClient::new(&ollama_url, &model);
            info!(model = client.model(), papers = input.papers.len(), "extracting");
            let report = pipeline.run(&units, &client).await;

            lacuna_core::write_results(&results, &report.questions)
                .with_context(|| format!("writing {}", results.display()))?;

            let rendered = display::render_questions(&report.questions);
            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "wrote output");
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Signals { papers, policy } => {
            if let Err(refusal) = contract::validate_inputs(&papers, contract::MAX_QUESTIONS) {
                println!("{refusal}");
                return Ok(ExitCode::FAILURE);
            }
            let extractor = SignalExtractor::new(load_policy(policy.as_deref())?)?;
            let units = ingest::load_papers(&papers)?;
            let scored = extractor.extract_scored(&units);
            println!("{}", display::render_signals(&scored));
        }
        Commands::Evaluate {
            benchmark,
            results,
            threshold,
            similarity,
            embed_model,
            ollama_url,
        } => {
            let config = EvalConfig::new(threshold)?;
            let comparison = evaluate::run_evaluation(
                &benchmark,
                &results,
                config,
                similarity,
                EmbeddingSettings {
                    ollama_url: &ollama_url,
                    embed_model: &embed_model,
                },
            )
            .await?;
            println!(
                "{}",
                display::render_comparison(
                    &comparison,
                    config.semantic_threshold,
                    similarity.as_str(),
                    chrono::Utc::now(),
                )
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_policy(path: Option<&Path>) -> anyhow::Result<Policy> {
    match path {
        Some(path) => Policy::from_toml_file(path)
            .with_context(|| format!("loading policy {}", path.display())),
        None => Ok(Policy::default()),
    }
}
