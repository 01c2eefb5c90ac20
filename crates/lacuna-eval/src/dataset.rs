//! Benchmark and prediction sets, keyed by paper in first-seen order.

use std::path::Path;

use indexmap::IndexMap;
use lacuna_core::QuestionRecord;
use tracing::info;

use crate::error::EvalError;

const PAPER_COLUMN: &str = "paper_id";
const QUESTION_COLUMN: &str = "ground_truth_question";

/// Ground-truth questions per paper. Duplicates within a paper collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Benchmark {
    papers: IndexMap<String, Vec<String>>,
}

impl Benchmark {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, paper_id: impl Into<String>, question: impl Into<String>) {
        let question = question.into();
        let questions = self.papers.entry(paper_id.into()).or_default();
        if !questions.contains(&question) {
            questions.push(question);
        }
    }

    /// Ground truths for `paper_id`, in first-seen order.
    pub fn get(&self, paper_id: &str) -> Option<&[String]> {
        self.papers.get(paper_id).map(Vec::as_slice)
    }

    pub fn contains(&self, paper_id: &str) -> bool {
        self.papers.contains_key(paper_id)
    }

    pub fn paper_ids(&self) -> impl Iterator<Item = &str> {
        self.papers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Parse a CSV document with a header row naming `paper_id` and
    /// `ground_truth_question`. Other columns are ignored.
    pub fn from_csv_str(input: &str) -> Result<Self, EvalError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut rows = parse_csv(input)?.into_iter();

        let Some((_, header)) = rows.next() else {
            return Err(EvalError::MissingColumn(PAPER_COLUMN));
        };
        let column = |name: &'static str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(EvalError::MissingColumn(name))
        };
        let paper_col = column(PAPER_COLUMN)?;
        let question_col = column(QUESTION_COLUMN)?;

        let mut benchmark = Self::new();
        for (line, row) in rows {
            if row.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let field = |idx: usize, name: &str| {
                row.get(idx)
                    .map(|f| f.trim())
                    .filter(|f| !f.is_empty())
                    .ok_or_else(|| EvalError::Csv {
                        line,
                        message: format!("empty {name}"),
                    })
            };
            let paper = field(paper_col, PAPER_COLUMN)?;
            let question = field(question_col, QUESTION_COLUMN)?;
            benchmark.insert(paper, question);
        }
        Ok(benchmark)
    }

    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let raw = std::fs::read_to_string(path).map_err(|source| EvalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let benchmark = Self::from_csv_str(&raw)?;
        info!(
            path = %path.display(),
            papers = benchmark.len(),
            "loaded benchmark"
        );
        Ok(benchmark)
    }
}

/// Parse CSV into rows, each tagged with the 1-based line it starts on.
/// Quoted fields may contain commas, newlines and `""` escapes; a closing
/// quote must end the field.
fn parse_csv(input: &str) -> Result<Vec<(usize, Vec<String>)>, EvalError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut after_quote = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut quote_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    after_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                _ => field.push(c),
            }
            continue;
        }
        if after_quote {
            after_quote = false;
            let at_row_end = c == '\n' || (c == '\r' && chars.peek() == Some(&'\n'));
            if c != ',' && !at_row_end {
                return Err(EvalError::Csv {
                    line,
                    message: "unexpected character after closing quote".into(),
                });
            }
            if c == '\r' {
                after_quote = true;
                continue;
            }
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            '"' => {
                return Err(EvalError::Csv {
                    line,
                    message: "unexpected quote inside unquoted field".into(),
                });
            }
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push((row_start, std::mem::take(&mut row)));
                line += 1;
                row_start = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(EvalError::Csv {
            line: quote_line,
            message: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push((row_start, row));
    }
    Ok(rows)
}

/// Predicted questions per paper, order-significant: the first entry is the
/// top-ranked prediction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predictions {
    papers: IndexMap<String, Vec<String>>,
}

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, paper_id: impl Into<String>, question: impl Into<String>) {
        self.papers
            .entry(paper_id.into())
            .or_default()
            .push(question.into());
    }

    pub fn get(&self, paper_id: &str) -> Option<&[String]> {
        self.papers.get(paper_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.papers.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of papers with at least one prediction.
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Group records by paper, keeping the `question` field in file order.
    pub fn from_records(records: &[QuestionRecord]) -> Self {
        let mut predictions = Self::new();
        for record in records {
            predictions.push(record.paper_id.clone(), record.question.clone());
        }
        predictions
    }

    pub fn load_results(path: &Path) -> Result<Self, EvalError> {
        let records = lacuna_core::read_results(path)?;
        Ok(Self::from_records(&records))
    }
}
