//! The text-generation capability the pipeline depends on.

use async_trait::async_trait;
use lacuna_core::NO_VALID_QUESTION;

use crate::error::GenerationError;

/// One prompt in, one raw response out.
///
/// Implementations are not assumed idempotent and are never retried.
/// Callers bound each call with a timeout.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: QuestionGenerator + ?Sized> QuestionGenerator for std::sync::Arc<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

/// A validated generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Question(String),
    /// The sentinel, or an empty response.
    NoQuestion,
}

impl GenerationOutcome {
    pub fn from_response(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NO_VALID_QUESTION {
            Self::NoQuestion
        } else {
            Self::Question(trimmed.to_string())
        }
    }
}
