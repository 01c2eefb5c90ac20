//! Turns text units into scored, gated signals.

use tracing::{debug, info};

use crate::detector::SignalDetector;
use crate::error::PolicyError;
use crate::policy::Policy;
use crate::scorer::{ScoreBreakdown, SignalScorer};
use crate::types::{Signal, TextUnit};

/// A retained signal together with the contributions behind its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredSignal {
    pub signal: Signal,
    pub breakdown: ScoreBreakdown,
}

/// Detector and scorer bound to one validated policy.
pub struct SignalExtractor {
    policy: Policy,
    detector: SignalDetector,
}

impl SignalExtractor {
    pub fn new(policy: Policy) -> Result<Self, PolicyError> {
        policy.validate()?;
        let detector = SignalDetector::new(&policy.patterns)?;
        Ok(Self { policy, detector })
    }

    /// Retained signals in detection order: unit order, then
    /// limitation/uncertainty/assumption within a unit.
    pub fn extract(&self, units: &[TextUnit]) -> Vec<Signal> {
        self.extract_scored(units)
            .into_iter()
            .map(|s| s.signal)
            .collect()
    }

    /// Like [`extract`](Self::extract), keeping each score breakdown.
    pub fn extract_scored(&self, units: &[TextUnit]) -> Vec<ScoredSignal> {
        let scorer = SignalScorer::new(&self.policy);
        let mut retained = Vec::new();
        let mut discarded = 0usize;

        for unit in units {
            if unit.text.trim().is_empty() {
                continue;
            }

            for (signal_type, matched_patterns) in self.detector.detect_all(&unit.text) {
                let breakdown = scorer.breakdown(signal_type, &matched_patterns, unit.section);
                let score = breakdown.total();
                debug!(
                    paper_id = %unit.paper_id,
                    page_number = unit.page_number,
                    %signal_type,
                    type_weight = breakdown.type_weight,
                    pattern_count = breakdown.pattern_count,
                    section_weight = breakdown.section_weight,
                    score,
                    "scored signal"
                );

                if !scorer.passes(score) {
                    discarded += 1;
                    continue;
                }

                retained.push(ScoredSignal {
                    signal: Signal {
                        signal_type,
                        matched_patterns,
                        score,
                        paper_id: unit.paper_id.clone(),
                        page_number: unit.page_number,
                        section: unit.section,
                        text_excerpt: excerpt(&unit.text, self.policy.excerpt_chars),
                    },
                    breakdown,
                });
            }
        }

        info!(
            units = units.len(),
            retained = retained.len(),
            discarded,
            "signal extraction complete"
        );
        retained
    }
}

/// First `max_chars` characters of `text`.
fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, SignalType};

    fn extractor() -> SignalExtractor {
        SignalExtractor::new(Policy::default()).unwrap()
    }

    fn unit(page: u32, section: Section, text: &str) -> TextUnit {
        TextUnit::new("Paper A", page, section, text)
    }

    #[test]
    fn empty_unit_yields_nothing() {
        assert!(extractor().extract(&[unit(1, Section::Methods, "")]).is_empty());
        assert!(extractor().extract(&[unit(1, Section::Methods, "  \n ")]).is_empty());
    }

    #[test]
    fn one_unit_can_yield_three_signals() {
        let text = "We assume stationarity. It is unclear whether this holds. A limitation is sample size.";
        let signals = extractor().extract(&[unit(2, Section::Methods, text)]);
        let types: Vec<SignalType> = signals.iter().map(|s| s.signal_type).collect();
        assert_eq!(
            types,
            vec![
                SignalType::Limitation,
                SignalType::Uncertainty,
                SignalType::Assumption
            ]
        );
        for s in &signals {
            assert_eq!(s.paper_id, "Paper A");
            assert_eq!(s.page_number, 2);
            assert_eq!(s.section, Section::Methods);
        }
    }

    #[test]
    fn boundary_is_inclusive() {
        // assumption (1) + one pattern (1) + introduction (1) = 3: below the gate.
        let below = extractor().extract(&[unit(1, Section::Introduction, "We assume linearity.")]);
        assert!(below.is_empty());

        // assumption (1) + one pattern (1) + discussion (2) = 4: exactly at the gate.
        let at = extractor().extract(&[unit(1, Section::Discussion, "We assume linearity.")]);
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].score, Policy::default().min_signal_score);
    }

    #[test]
    fn breakdown_matches_score() {
        let scored = extractor().extract_scored(&[unit(
            3,
            Section::Results,
            "Limitations remain; future work is needed.",
        )]);
        assert_eq!(scored.len(), 1);
        let s = &scored[0];
        assert_eq!(s.breakdown.type_weight, 3);
        assert_eq!(s.breakdown.pattern_count, 3);
        assert_eq!(s.breakdown.section_weight, 3);
        assert_eq!(s.signal.score, s.breakdown.total());
        assert_eq!(s.signal.matched_patterns.len(), 3);
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let mut policy = Policy::default();
        policy.excerpt_chars = 5;
        let ex = SignalExtractor::new(policy).unwrap();
        let signals = ex.extract(&[unit(1, Section::Methods, "Ünclear limitation in β decay")]);
        assert_eq!(signals[0].text_excerpt, "Üncle");
    }

    #[test]
    fn invalid_policy_rejected() {
        let mut policy = Policy::default();
        policy.global_cap = 0;
        assert!(SignalExtractor::new(policy).is_err());
    }

    #[test]
    fn extraction_is_deterministic() {
        let units = vec![
            unit(1, Section::Results, "It might fail; the cause is unknown."),
            unit(2, Section::Methods, "This was not evaluated."),
        ];
        let ex = extractor();
        assert_eq!(ex.extract(&units), ex.extract(&units));
    }
}
