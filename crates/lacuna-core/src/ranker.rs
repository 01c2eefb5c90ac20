//! Two-stage selection: a per-paper cap before generation and a global cap
//! after it.

use indexmap::IndexMap;
use tracing::info;

use crate::error::PolicyError;
use crate::policy::Policy;
use crate::types::{Question, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionRanker {
    per_source_cap: usize,
    global_cap: usize,
}

impl QuestionRanker {
    pub fn new(per_source_cap: usize, global_cap: usize) -> Result<Self, PolicyError> {
        if per_source_cap == 0 {
            return Err(PolicyError::ZeroCap {
                name: "per_source_cap",
            });
        }
        if global_cap == 0 {
            return Err(PolicyError::ZeroCap { name: "global_cap" });
        }
        Ok(Self {
            per_source_cap,
            global_cap,
        })
    }

    pub fn from_policy(policy: &Policy) -> Result<Self, PolicyError> {
        Self::new(policy.per_source_cap, policy.global_cap)
    }

    /// Keep at most `per_source_cap` signals per paper, preferring higher
    /// scores and breaking ties by detection order.
    ///
    /// Output keeps papers in first-appearance order and signals in
    /// detection order within each paper.
    pub fn select_per_source(&self, signals: Vec<Signal>) -> Vec<Signal> {
        let total = signals.len();
        let mut by_paper: IndexMap<String, Vec<(usize, Signal)>> = IndexMap::new();
        for (idx, signal) in signals.into_iter().enumerate() {
            by_paper
                .entry(signal.paper_id.clone())
                .or_default()
                .push((idx, signal));
        }

        let mut selected = Vec::with_capacity(total.min(by_paper.len() * self.per_source_cap));
        for (_, mut group) in by_paper {
            if group.len() > self.per_source_cap {
                // Stable: equal scores keep detection order.
                group.sort_by(|a, b| b.1.score.cmp(&a.1.score));
                group.truncate(self.per_source_cap);
                group.sort_by_key(|(idx, _)| *idx);
            }
            selected.extend(group.into_iter().map(|(_, s)| s));
        }

        info!(
            candidates = total,
            selected = selected.len(),
            per_source_cap = self.per_source_cap,
            "applied per-source cap"
        );
        selected
    }

    /// Drop "no question" results, sort by inherited score descending (ties
    /// keep input order) and keep at most `global_cap`.
    pub fn rank(&self, questions: Vec<Question>) -> Vec<Question> {
        let total = questions.len();
        let mut ranked: Vec<Question> = questions
            .into_iter()
            .filter(|q| !q.is_no_question())
            .collect();
        let valid = ranked.len();

        ranked.sort_by(|a, b| b.signal_score.cmp(&a.signal_score));
        ranked.truncate(self.global_cap);

        info!(
            total,
            valid,
            kept = ranked.len(),
            global_cap = self.global_cap,
            "ranked questions"
        );
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, SignalType};

    fn signal(paper: &str, page: u32, score: u32) -> Signal {
        Signal {
            signal_type: SignalType::Limitation,
            matched_patterns: vec!["limitation".into()],
            score,
            paper_id: paper.into(),
            page_number: page,
            section: Section::Methods,
            text_excerpt: format!("{paper} p{page}"),
        }
    }

    fn question(id: u32, paper: &str, score: u32, content: &str) -> Question {
        Question::from_signal(id, &signal(paper, id, score), content)
    }

    #[test]
    fn zero_caps_rejected() {
        assert!(QuestionRanker::new(0, 3).is_err());
        assert!(QuestionRanker::new(3, 0).is_err());
        assert!(QuestionRanker::new(1, 1).is_ok());
    }

    #[test]
    fn per_source_cap_keeps_highest_scores() {
        let ranker = QuestionRanker::new(2, 10).unwrap();
        let picked = ranker.select_per_source(vec![
            signal("A", 1, 4),
            signal("A", 2, 7),
            signal("A", 3, 5),
            signal("B", 1, 4),
        ]);
        let pages: Vec<(&str, u32)> = picked
            .iter()
            .map(|s| (s.paper_id.as_str(), s.page_number))
            .collect();
        // A keeps pages 2 and 3 (scores 7, 5) in detection order; B is under the cap.
        assert_eq!(pages, vec![("A", 2), ("A", 3), ("B", 1)]);
    }

    #[test]
    fn per_source_ties_prefer_detection_order() {
        let ranker = QuestionRanker::new(1, 10).unwrap();
        let picked = ranker.select_per_source(vec![signal("A", 1, 5), signal("A", 2, 5)]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].page_number, 1);
    }

    #[test]
    fn per_source_groups_interleaved_papers() {
        let ranker = QuestionRanker::new(1, 10).unwrap();
        let picked = ranker.select_per_source(vec![
            signal("A", 1, 4),
            signal("B", 1, 9),
            signal("A", 2, 6),
        ]);
        let ids: Vec<(&str, u32)> = picked
            .iter()
            .map(|s| (s.paper_id.as_str(), s.page_number))
            .collect();
        assert_eq!(ids, vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let ranker = QuestionRanker::new(3, 2).unwrap();
        let ranked = ranker.rank(vec![
            question(1, "A", 4, "q1"),
            question(2, "A", 8, "q2"),
            question(3, "B", 6, "q3"),
        ]);
        let ids: Vec<u32> = ranked.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn rank_ties_keep_insertion_order() {
        let ranker = QuestionRanker::new(3, 10).unwrap();
        let ranked = ranker.rank(vec![
            question(1, "A", 5, "q1"),
            question(2, "B", 5, "q2"),
            question(3, "C", 5, "q3"),
        ]);
        let ids: Vec<u32> = ranked.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn sentinel_questions_do_not_count_against_cap() {
        let ranker = QuestionRanker::new(3, 2).unwrap();
        let ranked = ranker.rank(vec![
            question(1, "A", 9, "NO_VALID_QUESTION"),
            question(2, "A", 8, ""),
            question(3, "B", 4, "q3"),
            question(4, "C", 3, "q4"),
        ]);
        let ids: Vec<u32> = ranked.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn output_never_exceeds_cap() {
        for cap in 1..6 {
            let ranker = QuestionRanker::new(3, cap).unwrap();
            let qs = (1..=4).map(|i| question(i, "A", i, "q")).collect();
            let ranked = ranker.rank(qs);
            assert!(ranked.len() <= cap);
            assert!(ranked.windows(2).all(|w| w[0].signal_score >= w[1].signal_score));
        }
    }

    #[test]
    fn scores_are_inherited_through_ranking() {
        let ranker = QuestionRanker::new(3, 3).unwrap();
        let ranked = ranker.rank(vec![question(1, "A", 7, "q")]);
        assert_eq!(ranked[0].signal_score, 7);
    }
}
