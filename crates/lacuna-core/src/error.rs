use thiserror::Error;

use crate::types::SignalType;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{name} must be at least 1")]
    ZeroCap { name: &'static str },

    #[error("pattern bank for {0} is empty")]
    EmptyBank(SignalType),

    #[error("invalid {signal_type} pattern {pattern:?}: {source}")]
    BadPattern {
        signal_type: SignalType,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{signal_type} pattern {pattern:?} is listed more than once")]
    DuplicatePattern {
        signal_type: SignalType,
        pattern: String,
    },

    #[error("type weights must rank limitation > uncertainty > assumption (got {limitation}, {uncertainty}, {assumption})")]
    TypeWeightOrder {
        limitation: u32,
        uncertainty: u32,
        assumption: u32,
    },

    #[error("section weights must rank methods/results >= discussion >= introduction/unknown")]
    SectionWeightOrder,

    #[error("excerpt_chars must be at least 1")]
    ZeroExcerpt,

    #[error("reading policy file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing policy file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("results file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("results JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
