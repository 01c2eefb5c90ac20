//! Question generation layer: turns retained signals into questions through
//! an injected text-generation backend, and ranks the results.

mod embedding;
mod error;
mod extractor;
mod generator;
mod pipeline;
mod prompt;

#[cfg(feature = "ollama")]
mod ollama;

pub use embedding::{EmbeddingSource, EmbeddingTable, cosine_similarity};
pub use error::GenerationError;
pub use extractor::{GenerationStats, extract_questions};
pub use generator::{GenerationOutcome, QuestionGenerator};
pub use pipeline::{DEFAULT_TIMEOUT, Pipeline, PipelineOptions, PipelineReport, run_pipeline};
pub use prompt::build_question_prompt;

#[cfg(feature = "ollama")]
pub use ollama::{DEFAULT_BASE_URL, DEFAULT_EMBED_MODEL, DEFAULT_MODEL, OllamaClient};
