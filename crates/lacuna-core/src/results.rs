//! Persisted run results: one JSON array of records per run, overwritten
//! each time.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ResultsError;
use crate::types::{Question, SignalType};

/// One persisted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub paper_id: String,
    pub page_number: u32,
    pub signal_type: SignalType,
    pub signal_score: u32,
    pub question: String,
    /// Excerpt of the originating signal. Absent in older result files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

impl From<&Question> for QuestionRecord {
    fn from(q: &Question) -> Self {
        Self {
            paper_id: q.paper_id.clone(),
            page_number: q.page_number,
            signal_type: q.signal_type,
            signal_score: q.signal_score,
            question: q.content.clone(),
            evidence: (!q.evidence.is_empty()).then(|| q.evidence.clone()),
        }
    }
}

/// Write `questions` to `path`, replacing any previous file.
pub fn write_results(path: &Path, questions: &[Question]) -> Result<(), ResultsError> {
    let records: Vec<QuestionRecord> = questions.iter().map(QuestionRecord::from).collect();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), count = records.len(), "wrote results");
    Ok(())
}

/// Read a results document back, in file order.
pub fn read_results(path: &Path) -> Result<Vec<QuestionRecord>, ResultsError> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<QuestionRecord> = serde_json::from_str(&raw)?;
    if let Some(index) = records.iter().position(|r| r.paper_id.trim().is_empty()) {
        return Err(ResultsError::InvalidRecord {
            index,
            reason: "empty paper_id".into(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, Signal};

    fn question(paper: &str, score: u32, content: &str) -> Question {
        let signal = Signal {
            signal_type: SignalType::Assumption,
            matched_patterns: vec!["we assume".into()],
            score,
            paper_id: paper.into(),
            page_number: 3,
            section: Section::Discussion,
            text_excerpt: "We assume the sensor is calibrated.".into(),
        };
        Question::from_signal(1, &signal, content)
    }

    #[test]
    fn write_then_read_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs").join("latest_results.json");
        let qs = vec![question("Paper A", 5, "QUESTION: a?"), question("Paper B", 4, "QUESTION: b?")];

        write_results(&path, &qs).unwrap();
        let records = read_results(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].paper_id, "Paper A");
        assert_eq!(records[0].signal_type, SignalType::Assumption);
        assert_eq!(records[0].signal_score, 5);
        assert_eq!(records[0].question, "QUESTION: a?");
        assert_eq!(
            records[0].evidence.as_deref(),
            Some("We assume the sensor is calibrated.")
        );
        assert_eq!(records[1].paper_id, "Paper B");
    }

    #[test]
    fn second_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results(&path, &[question("Paper A", 5, "a"), question("Paper B", 5, "b")]).unwrap();
        write_results(&path, &[question("Paper C", 5, "c")]).unwrap();
        let records = read_results(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].paper_id, "Paper C");
    }

    #[test]
    fn evidence_is_optional_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(
            &path,
            r#"[{"paper_id":"P1","page_number":2,"signal_type":"limitation","signal_score":6,"question":"What causes the drift?"}]"#,
        )
        .unwrap();
        let records = read_results(&path).unwrap();
        assert_eq!(records[0].evidence, None);
        assert_eq!(records[0].question, "What causes the drift?");
    }

    #[test]
    fn empty_paper_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(
            &path,
            r#"[{"paper_id":" ","page_number":1,"signal_type":"limitation","signal_score":6,"question":"q"}]"#,
        )
        .unwrap();
        assert!(matches!(
            read_results(&path),
            Err(ResultsError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn empty_run_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(read_results(&path).unwrap().is_empty());
    }
}
