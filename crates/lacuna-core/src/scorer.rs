//! Additive signal scoring and the minimum-score gate.
//!
//! `score = type_weight + |matched_patterns| + section_weight`. Each term is
//! kept in a [`ScoreBreakdown`] so any retained signal can be audited.

use crate::policy::Policy;
use crate::types::{Section, SignalType};

/// The three named contributions to a signal's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub type_weight: u32,
    pub pattern_count: u32,
    pub section_weight: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.type_weight
            .saturating_add(self.pattern_count)
            .saturating_add(self.section_weight)
    }
}

pub struct SignalScorer<'a> {
    policy: &'a Policy,
}

impl<'a> SignalScorer<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    pub fn breakdown(
        &self,
        signal_type: SignalType,
        matched_patterns: &[String],
        section: Section,
    ) -> ScoreBreakdown {
        ScoreBreakdown {
            type_weight: self.policy.type_weights.weight(signal_type),
            pattern_count: u32::try_from(matched_patterns.len()).unwrap_or(u32::MAX),
            section_weight: self.policy.section_weights.weight(section),
        }
    }

    pub fn score(&self, signal_type: SignalType, matched_patterns: &[String], section: Section) -> u32 {
        self.breakdown(signal_type, matched_patterns, section).total()
    }

    /// Whether a score clears `min_signal_score` (inclusive).
    pub fn passes(&self, score: u32) -> bool {
        score >= self.policy.min_signal_score
    }
}
