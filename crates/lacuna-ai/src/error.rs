use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[cfg(feature = "ollama")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("empty embedding returned for {0:?}")]
    EmptyEmbedding(String),

    #[error("{0}")]
    Other(String),
}
