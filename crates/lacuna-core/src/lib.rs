//! Signal detection, scoring and ranking for unanswered-question extraction.
//!
//! Everything here is a pure function of its inputs plus an immutable
//! [`Policy`]. Question generation and evaluation live in `lacuna-ai` and
//! `lacuna-eval`.

pub mod detector;
mod error;
pub mod extract;
pub mod policy;
pub mod ranker;
pub mod results;
pub mod scorer;
pub mod types;

pub use detector::SignalDetector;
pub use error::{PolicyError, ResultsError};
pub use extract::{ScoredSignal, SignalExtractor};
pub use policy::Policy;
pub use ranker::QuestionRanker;
pub use results::{QuestionRecord, read_results, write_results};
pub use scorer::{ScoreBreakdown, SignalScorer};
pub use types::{NO_VALID_QUESTION, Question, Section, Signal, SignalType, TextUnit};
