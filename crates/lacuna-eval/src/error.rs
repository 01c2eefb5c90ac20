use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("benchmark CSV line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("benchmark CSV is missing column {0:?}")]
    MissingColumn(&'static str),

    #[error("semantic threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("no predictions for any benchmarked paper ({skipped_papers} skipped)")]
    NoPredictions { skipped_papers: usize },

    #[error(transparent)]
    Results(#[from] lacuna_core::ResultsError),
}
