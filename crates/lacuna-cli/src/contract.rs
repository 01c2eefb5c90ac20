//! Input contract checked before any paper is read.

use std::fmt;
use std::path::{Path, PathBuf};

pub const MIN_PAPERS: usize = 3;
pub const MAX_QUESTIONS: usize = 5;
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt"];

/// A request the tool declines to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    TooFewPapers,
    UnsupportedFile,
    FileNotFound,
    TooManyQuestions,
}

impl Refusal {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TooFewPapers => "TOO_FEW_PAPERS",
            Self::UnsupportedFile => "UNSUPPORTED_FILE",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::TooManyQuestions => "TOO_MANY_QUESTIONS",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::TooFewPapers => {
                "At least 3 papers are required to extract unresolved research questions."
            }
            Self::UnsupportedFile => "Only plain text (.txt) files are supported.",
            Self::FileNotFound => "One or more provided paper paths do not exist.",
            Self::TooManyQuestions => "Requested number of questions exceeds the allowed maximum.",
        }
    }
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Refusal {}

/// Checked request: papers in argument order plus the question limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub papers: Vec<PathBuf>,
    pub max_questions: usize,
}

/// Check paper count, then each path (existence before extension), then the
/// question limit. The first violation wins.
pub fn validate_inputs(papers: &[PathBuf], max_questions: usize) -> Result<ValidatedInput, Refusal> {
    if papers.len() < MIN_PAPERS {
        return Err(Refusal::TooFewPapers);
    }
    for path in papers {
        if !path.exists() {
            return Err(Refusal::FileNotFound);
        }
        if !has_allowed_extension(path) {
            return Err(Refusal::UnsupportedFile);
        }
    }
    if max_questions > MAX_QUESTIONS {
        return Err(Refusal::TooManyQuestions);
    }
    Ok(ValidatedInput {
        papers: papers.to_vec(),
        max_questions,
    })
}

fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}
