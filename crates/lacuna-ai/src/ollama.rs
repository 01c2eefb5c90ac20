//! Ollama HTTP backend for question generation and embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::EmbeddingSource;
use crate::error::GenerationError;
use crate::generator::QuestionGenerator;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "phi3:mini";
pub const DEFAULT_EMBED_MODEL: &str = "all-minilm";

/// Client for a local Ollama server.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    embed_model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// `base_url` should be like `http://localhost:11434` (no trailing slash).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }

    /// Use a different model for embeddings.
    pub fn with_embed_model(mut self, embed_model: impl Into<String>) -> Self {
        self.embed_model = embed_model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, GenerationError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl QuestionGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "requesting generation");
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let result: GenerateResponse = self.post("/api/generate", &body).await?.json().await?;
        info!(model = %self.model, response_chars = result.response.len(), "generation complete");
        Ok(result.response)
    }
}

#[async_trait]
impl EmbeddingSource for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        let body = EmbeddingRequest {
            model: &self.embed_model,
            prompt: text,
        };
        let result: EmbeddingResponse = self.post("/api/embeddings", &body).await?.json().await?;
        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", DEFAULT_MODEL);
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "phi3:mini");
        assert_eq!(client.embed_model, DEFAULT_EMBED_MODEL);
    }

    #[test]
    fn embed_model_override() {
        let client = OllamaClient::new(DEFAULT_BASE_URL, DEFAULT_MODEL).with_embed_model("nomic-embed-text");
        assert_eq!(client.embed_model, "nomic-embed-text");
    }

    #[test]
    fn generate_request_disables_streaming() {
        let body = GenerateRequest {
            model: "phi3:mini",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "phi3:mini", "prompt": "hello", "stream": false})
        );
    }

    #[test]
    fn responses_parse() {
        let generated: GenerateResponse =
            serde_json::from_str(r#"{"model":"phi3:mini","response":"QUESTION: x","done":true}"#).unwrap();
        assert_eq!(generated.response, "QUESTION: x");

        let embedded: EmbeddingResponse = serde_json::from_str(r#"{"embedding":[0.5,-0.25]}"#).unwrap();
        assert_eq!(embedded.embedding, vec![0.5, -0.25]);
    }
}
