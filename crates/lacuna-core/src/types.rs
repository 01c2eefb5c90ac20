//! Shared data model: text units, scored signals and generated questions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker returned by the generation step when no question can be derived.
pub const NO_VALID_QUESTION: &str = "NO_VALID_QUESTION";

/// One cleaned excerpt of a paper, produced upstream by ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub paper_id: String,
    /// 1-based page number in the source document.
    pub page_number: u32,
    pub section: Section,
    pub text: String,
}

impl TextUnit {
    pub fn new(
        paper_id: impl Into<String>,
        page_number: u32,
        section: Section,
        text: impl Into<String>,
    ) -> Self {
        Self {
            paper_id: paper_id.into(),
            page_number,
            section,
            text: text.into(),
        }
    }
}

/// Category of evidence a signal represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    /// An explicitly stated limitation or gap.
    Limitation,
    /// Hedged or uncertain language.
    Uncertainty,
    /// An unverified premise the authors rely on.
    Assumption,
}

impl SignalType {
    /// Detection order within a single text unit.
    pub const ALL: [SignalType; 3] = [Self::Limitation, Self::Uncertainty, Self::Assumption];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limitation => "limitation",
            Self::Uncertainty => "uncertainty",
            Self::Assumption => "assumption",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse paper section a text unit was tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    Introduction,
    Methods,
    Results,
    Discussion,
    Limitations,
    Conclusion,
    #[default]
    Unknown,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Methods => "methods",
            Self::Results => "results",
            Self::Discussion => "discussion",
            Self::Limitations => "limitations",
            Self::Conclusion => "conclusion",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored piece of evidence extracted from exactly one [`TextUnit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub signal_type: SignalType,
    /// Pattern identifiers that matched, in bank order.
    pub matched_patterns: Vec<String>,
    pub score: u32,
    pub paper_id: String,
    pub page_number: u32,
    pub section: Section,
    pub text_excerpt: String,
}

/// A generated question, carrying its originating signal's provenance and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub question_id: u32,
    pub paper_id: String,
    pub page_number: u32,
    pub signal_type: SignalType,
    /// Inherited from the originating signal, never recomputed.
    pub signal_score: u32,
    /// Opaque generated text.
    pub content: String,
    /// Excerpt of the originating signal.
    pub evidence: String,
}

impl Question {
    /// Combine a signal with one generation result.
    pub fn from_signal(question_id: u32, signal: &Signal, content: impl Into<String>) -> Self {
        Self {
            question_id,
            paper_id: signal.paper_id.clone(),
            page_number: signal.page_number,
            signal_type: signal.signal_type,
            signal_score: signal.score,
            content: content.into(),
            evidence: signal.text_excerpt.clone(),
        }
    }

    /// Whether the content is the generation sentinel or empty.
    pub fn is_no_question(&self) -> bool {
        let content = self.content.trim();
        content.is_empty() || content == NO_VALID_QUESTION
    }

    /// Source line rendered under each question.
    pub fn citation(&self) -> String {
        format!(
            "{} — page {} ({})",
            self.paper_id, self.page_number, self.signal_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal() -> Signal {
        Signal {
            signal_type: SignalType::Uncertainty,
            matched_patterns: vec!["unclear".into()],
            score: 6,
            paper_id: "Paper B".into(),
            page_number: 4,
            section: Section::Results,
            text_excerpt: "It is unclear whether the effect persists.".into(),
        }
    }

    #[test]
    fn question_inherits_signal_provenance_and_score() {
        let q = Question::from_signal(2, &signal(), "QUESTION: Does the effect persist?");
        assert_eq!(q.question_id, 2);
        assert_eq!(q.paper_id, "Paper B");
        assert_eq!(q.page_number, 4);
        assert_eq!(q.signal_type, SignalType::Uncertainty);
        assert_eq!(q.signal_score, 6);
        assert_eq!(q.evidence, "It is unclear whether the effect persists.");
    }

    #[test]
    fn citation_format() {
        let q = Question::from_signal(1, &signal(), "QUESTION: x");
        assert_eq!(q.citation(), "Paper B — page 4 (uncertainty)");
    }

    #[test]
    fn sentinel_and_empty_are_no_question() {
        assert!(Question::from_signal(1, &signal(), "  NO_VALID_QUESTION \n").is_no_question());
        assert!(Question::from_signal(1, &signal(), "   ").is_no_question());
        assert!(!Question::from_signal(1, &signal(), "QUESTION: y").is_no_question());
    }

    #[test]
    fn signal_type_display() {
        for t in SignalType::ALL {
            assert_eq!(t.to_string(), t.as_str());
        }
        assert_eq!(SignalType::Limitation.to_string(), "limitation");
    }

    #[test]
    fn signal_type_serde_is_lowercase() {
        let json = serde_json::to_string(&SignalType::Assumption).unwrap();
        assert_eq!(json, "\"assumption\"");
    }

    #[test]
    fn section_labels() {
        assert_eq!(Section::default(), Section::Unknown);
        assert_eq!(Section::Discussion.to_string(), "discussion");
    }
}
