//! Policy configuration: pattern banks, weight tables, thresholds and caps.
//!
//! A [`Policy`] is built once at start-up and passed explicitly into the
//! detector, scorer and ranker. Values here change what the tool is willing
//! to report, so every change is a policy decision, not a tuning knob.
//!
//! Policies can be overlaid from TOML; any key left out keeps its default:
//!
//! ```toml
//! min_signal_score = 5
//! per_source_cap = 2
//!
//! [section_weights]
//! discussion = 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::types::{Section, SignalType};

/// Minimum score a signal needs to be retained (inclusive).
pub const DEFAULT_MIN_SIGNAL_SCORE: u32 = 4;
/// Signals advanced to question generation per paper.
pub const DEFAULT_PER_SOURCE_CAP: usize = 3;
/// Questions kept after global ranking.
pub const DEFAULT_GLOBAL_CAP: usize = 3;
/// Characters of the source text kept as the signal excerpt.
pub const DEFAULT_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Policy {
    pub patterns: PatternBanks,
    pub type_weights: TypeWeights,
    pub section_weights: SectionWeights,
    pub min_signal_score: u32,
    pub excerpt_chars: usize,
    pub per_source_cap: usize,
    pub global_cap: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            patterns: PatternBanks::default(),
            type_weights: TypeWeights::default(),
            section_weights: SectionWeights::default(),
            min_signal_score: DEFAULT_MIN_SIGNAL_SCORE,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            per_source_cap: DEFAULT_PER_SOURCE_CAP,
            global_cap: DEFAULT_GLOBAL_CAP,
        }
    }
}

impl Policy {
    /// Parse a TOML overlay on top of the defaults and validate it.
    pub fn from_toml_str(raw: &str) -> Result<Self, PolicyError> {
        let policy: Policy = toml::from_str(raw)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a TOML policy file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::from_toml_str(&raw)?;
        tracing::info!(path = %path.display(), "loaded policy file");
        Ok(policy)
    }

    /// Replace both selection caps, re-validating.
    pub fn with_caps(mut self, per_source_cap: usize, global_cap: usize) -> Result<Self, PolicyError> {
        self.per_source_cap = per_source_cap;
        self.global_cap = global_cap;
        self.validate()?;
        Ok(self)
    }

    /// Reject policies that are programmer errors rather than preferences.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.per_source_cap == 0 {
            return Err(PolicyError::ZeroCap {
                name: "per_source_cap",
            });
        }
        if self.global_cap == 0 {
            return Err(PolicyError::ZeroCap { name: "global_cap" });
        }
        if self.excerpt_chars == 0 {
            return Err(PolicyError::ZeroExcerpt);
        }

        let tw = &self.type_weights;
        if !(tw.limitation > tw.uncertainty && tw.uncertainty > tw.assumption) {
            return Err(PolicyError::TypeWeightOrder {
                limitation: tw.limitation,
                uncertainty: tw.uncertainty,
                assumption: tw.assumption,
            });
        }

        let sw = &self.section_weights;
        let ordered = sw.methods.min(sw.results) >= sw.discussion
            && sw.discussion >= sw.introduction.max(sw.unknown);
        if !ordered {
            return Err(PolicyError::SectionWeightOrder);
        }

        for signal_type in SignalType::ALL {
            let bank = self.patterns.bank(signal_type);
            if bank.is_empty() {
                return Err(PolicyError::EmptyBank(signal_type));
            }
            for (idx, pattern) in bank.iter().enumerate() {
                if bank[..idx].contains(pattern) {
                    return Err(PolicyError::DuplicatePattern {
                        signal_type,
                        pattern: pattern.clone(),
                    });
                }
                regex::Regex::new(pattern).map_err(|source| PolicyError::BadPattern {
                    signal_type,
                    pattern: pattern.clone(),
                    source,
                })?;
            }
        }

        Ok(())
    }
}

/// Category-specific phrase banks. Conservative: biased toward precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternBanks {
    pub limitation: Vec<String>,
    pub uncertainty: Vec<String>,
    pub assumption: Vec<String>,
}

impl PatternBanks {
    pub fn bank(&self, signal_type: SignalType) -> &[String] {
        match signal_type {
            SignalType::Limitation => &self.limitation,
            SignalType::Uncertainty => &self.uncertainty,
            SignalType::Assumption => &self.assumption,
        }
    }
}

impl Default for PatternBanks {
    fn default() -> Self {
        let owned = |patterns: &[&str]| patterns.iter().map(|p| p.to_string()).collect();
        Self {
            limitation: owned(&[
                r"limitation",
                r"limitations",
                r"future work",
                r"further research",
                r"not evaluated",
                r"not investigated",
                r"was not assessed",
                r"remains to be determined",
            ]),
            uncertainty: owned(&[
                r"\bmay\b",
                r"\bmight\b",
                r"\bcould\b",
                r"suggests?",
                r"appears? to",
                r"unclear",
                r"unknown",
                r"not clear",
            ]),
            assumption: owned(&[
                r"we assume",
                r"it is assumed",
                r"is generally assumed",
                r"is widely accepted",
                r"commonly believed",
                r"it is believed",
            ]),
        }
    }
}

/// Base weight per signal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeWeights {
    pub limitation: u32,
    pub uncertainty: u32,
    pub assumption: u32,
}

impl TypeWeights {
    pub fn weight(&self, signal_type: SignalType) -> u32 {
        match signal_type {
            SignalType::Limitation => self.limitation,
            SignalType::Uncertainty => self.uncertainty,
            SignalType::Assumption => self.assumption,
        }
    }
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            limitation: 3,
            uncertainty: 2,
            assumption: 1,
        }
    }
}

/// Weight per section. Sections without their own entry use `unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionWeights {
    pub methods: u32,
    pub results: u32,
    pub discussion: u32,
    pub introduction: u32,
    pub unknown: u32,
}

impl SectionWeights {
    pub fn weight(&self, section: Section) -> u32 {
        match section {
            Section::Methods => self.methods,
            Section::Results => self.results,
            Section::Discussion => self.discussion,
            Section::Introduction => self.introduction,
            Section::Limitations | Section::Conclusion | Section::Unknown => self.unknown,
        }
    }
}

impl Default for SectionWeights {
    fn default() -> Self {
        Self {
            methods: 3,
            results: 3,
            discussion: 2,
            introduction: 1,
            unknown: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        Policy::default().validate().unwrap();
    }

    #[test]
    fn default_values() {
        let p = Policy::default();
        assert_eq!(p.min_signal_score, 4);
        assert_eq!(p.per_source_cap, DEFAULT_PER_SOURCE_CAP);
        assert_eq!(p.global_cap, DEFAULT_GLOBAL_CAP);
        assert_eq!(p.excerpt_chars, 500);
        assert_eq!(p.patterns.bank(SignalType::Limitation).len(), 8);
        assert_eq!(p.patterns.bank(SignalType::Assumption).len(), 6);
    }

    #[test]
    fn zero_global_cap_rejected() {
        let err = Policy::default().with_caps(3, 0).unwrap_err();
        assert!(matches!(err, PolicyError::ZeroCap { name: "global_cap" }));
    }

    #[test]
    fn zero_per_source_cap_rejected() {
        let err = Policy::default().with_caps(0, 3).unwrap_err();
        assert!(matches!(err, PolicyError::ZeroCap { name: "per_source_cap" }));
    }

    #[test]
    fn type_weight_order_enforced() {
        let mut p = Policy::default();
        p.type_weights.assumption = 5;
        assert!(matches!(
            p.validate(),
            Err(PolicyError::TypeWeightOrder { .. })
        ));
    }

    #[test]
    fn section_weight_order_enforced() {
        let mut p = Policy::default();
        p.section_weights.introduction = 3;
        assert!(matches!(p.validate(), Err(PolicyError::SectionWeightOrder)));
    }

    #[test]
    fn bad_pattern_rejected() {
        let mut p = Policy::default();
        p.patterns.uncertainty.push("(unclosed".into());
        assert!(matches!(
            p.validate(),
            Err(PolicyError::BadPattern {
                signal_type: SignalType::Uncertainty,
                ..
            })
        ));
    }

    #[test]
    fn repeated_pattern_rejected() {
        let mut p = Policy::default();
        p.patterns.limitation.push("not evaluated".into());
        assert!(matches!(
            p.validate(),
            Err(PolicyError::DuplicatePattern {
                signal_type: SignalType::Limitation,
                ref pattern,
            }) if pattern == "not evaluated"
        ));

        let err = Policy::from_toml_str(
            r#"
            [patterns]
            limitation = ["not evaluated", "not evaluated"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::DuplicatePattern { .. }));
    }

    #[test]
    fn same_pattern_in_different_banks_allowed() {
        let mut p = Policy::default();
        p.patterns.assumption.push("unclear".into());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn empty_bank_rejected() {
        let mut p = Policy::default();
        p.patterns.assumption.clear();
        assert!(matches!(
            p.validate(),
            Err(PolicyError::EmptyBank(SignalType::Assumption))
        ));
    }

    #[test]
    fn toml_overlay_keeps_defaults() {
        let p = Policy::from_toml_str(
            r#"
            min_signal_score = 5
            per_source_cap = 2

            [section_weights]
            discussion = 3
            "#,
        )
        .unwrap();
        assert_eq!(p.min_signal_score, 5);
        assert_eq!(p.per_source_cap, 2);
        assert_eq!(p.global_cap, DEFAULT_GLOBAL_CAP);
        assert_eq!(p.section_weights.discussion, 3);
        assert_eq!(p.section_weights.methods, 3);
        assert_eq!(p.type_weights, TypeWeights::default());
    }

    #[test]
    fn toml_unknown_key_rejected() {
        assert!(matches!(
            Policy::from_toml_str("max_signals = 4"),
            Err(PolicyError::Toml(_))
        ));
    }

    #[test]
    fn toml_invalid_policy_rejected() {
        assert!(matches!(
            Policy::from_toml_str("global_cap = 0"),
            Err(PolicyError::ZeroCap { .. })
        ));
    }

    #[test]
    fn policy_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "global_cap = 5\n").unwrap();
        let p = Policy::from_toml_file(&path).unwrap();
        assert_eq!(p.global_cap, 5);
    }

    #[test]
    fn missing_policy_file_reports_path() {
        let err = Policy::from_toml_file("/nonexistent/policy.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/policy.toml"));
    }

    #[test]
    fn unlisted_sections_use_unknown_weight() {
        let w = SectionWeights::default();
        assert_eq!(w.weight(Section::Limitations), w.unknown);
        assert_eq!(w.weight(Section::Conclusion), w.unknown);
        assert_eq!(w.weight(Section::Results), 3);
    }
}
