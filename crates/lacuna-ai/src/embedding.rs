//! Embedding-backed text similarity.
//!
//! Embeddings are fetched once per distinct text up front; afterwards
//! [`EmbeddingTable::similarity`] is a synchronous cosine lookup that can be
//! handed to the evaluation harness as its similarity function.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use crate::error::GenerationError;

/// Produces one embedding vector per text.
#[async_trait]
pub trait EmbeddingSource: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError>;
}

/// Pre-computed, L2-normalized embeddings keyed by text.
#[derive(Debug, Default)]
pub struct EmbeddingTable {
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    /// Embed every distinct text in `texts`.
    pub async fn build<'a, E, I>(source: &E, texts: I) -> Result<Self, GenerationError>
    where
        E: EmbeddingSource + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let mut vectors = HashMap::new();
        for text in texts {
            if vectors.contains_key(text) {
                continue;
            }
            let mut v = source.embed(text).await?;
            if v.is_empty() {
                return Err(GenerationError::EmptyEmbedding(text.to_string()));
            }
            normalize(&mut v);
            vectors.insert(text.to_string(), v);
        }
        info!(texts = vectors.len(), "built embedding table");
        Ok(Self { vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Cosine similarity clamped to [0, 1]. Identical strings score 1.0;
    /// texts that were never embedded score 0.0.
    pub fn similarity(&self, a: &str, b: &str) -> f32 {
        if a == b {
            return 1.0;
        }
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(va), Some(vb)) => cosine_similarity(va, vb).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero norm or the
/// dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
