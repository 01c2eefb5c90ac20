//! Category-specific pattern matching over a single text unit.

use regex::{Regex, RegexBuilder};

use crate::error::PolicyError;
use crate::policy::PatternBanks;
use crate::types::SignalType;

/// A pattern and its compiled, case-insensitive matcher.
struct Pattern {
    id: String,
    regex: Regex,
}

/// Compiled pattern banks, one per [`SignalType`].
pub struct SignalDetector {
    banks: [(SignalType, Vec<Pattern>); 3],
}

impl SignalDetector {
    /// Compile every bank. Fails on an empty bank, a repeated pattern or an
    /// invalid pattern.
    pub fn new(patterns: &PatternBanks) -> Result<Self, PolicyError> {
        let compile = |signal_type: SignalType| -> Result<(SignalType, Vec<Pattern>), PolicyError> {
            let bank = patterns.bank(signal_type);
            if bank.is_empty() {
                return Err(PolicyError::EmptyBank(signal_type));
            }
            let compiled = bank
                .iter()
                .enumerate()
                .map(|(idx, p)| {
                    if bank[..idx].contains(p) {
                        return Err(PolicyError::DuplicatePattern {
                            signal_type,
                            pattern: p.clone(),
                        });
                    }
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .map(|regex| Pattern {
                            id: p.clone(),
                            regex,
                        })
                        .map_err(|source| PolicyError::BadPattern {
                            signal_type,
                            pattern: p.clone(),
                            source,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((signal_type, compiled))
        };

        Ok(Self {
            banks: [
                compile(SignalType::Limitation)?,
                compile(SignalType::Uncertainty)?,
                compile(SignalType::Assumption)?,
            ],
        })
    }

    /// Identifiers of every pattern in `signal_type`'s bank that matches `text`,
    /// in bank order. Empty when nothing matches or the text is blank.
    pub fn detect(&self, text: &str, signal_type: SignalType) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.bank(signal_type)
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Run all three banks, skipping categories with no matches.
    pub fn detect_all(&self, text: &str) -> Vec<(SignalType, Vec<String>)> {
        SignalType::ALL
            .into_iter()
            .filter_map(|t| {
                let hits = self.detect(text, t);
                (!hits.is_empty()).then_some((t, hits))
            })
            .collect()
    }

    fn bank(&self, signal_type: SignalType) -> &[Pattern] {
        self.banks
            .iter()
            .find(|(t, _)| *t == signal_type)
            .map(|(_, bank)| bank.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SignalDetector {
        SignalDetector::new(&PatternBanks::default()).unwrap()
    }

    #[test]
    fn empty_text_matches_nothing() {
        let d = detector();
        for t in SignalType::ALL {
            assert!(d.detect("", t).is_empty());
            assert!(d.detect("   \t ", t).is_empty());
        }
        assert!(d.detect_all("").is_empty());
    }

    #[test]
    fn case_insensitive() {
        let d = detector();
        let hits = d.detect("FUTURE WORK should address this.", SignalType::Limitation);
        assert_eq!(hits, vec!["future work".to_string()]);
    }

    #[test]
    fn plural_matches_both_patterns_in_bank_order() {
        let d = detector();
        let hits = d.detect("Limitations of this study include...", SignalType::Limitation);
        assert_eq!(hits, vec!["limitation".to_string(), "limitations".to_string()]);
    }

    #[test]
    fn uncertainty_word_boundaries() {
        let d = detector();
        assert!(d.detect("The dismay was palpable.", SignalType::Uncertainty).is_empty());
        assert_eq!(
            d.detect("This may indicate drift.", SignalType::Uncertainty),
            vec![r"\bmay\b".to_string()]
        );
    }

    #[test]
    fn detect_all_reports_each_category_once() {
        let d = detector();
        let text = "We assume stationarity. It is unclear whether this holds; future work will test it.";
        let all = d.detect_all(text);
        let types: Vec<SignalType> = all.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            types,
            vec![
                SignalType::Limitation,
                SignalType::Uncertainty,
                SignalType::Assumption
            ]
        );
    }

    #[test]
    fn no_match_is_empty() {
        let d = detector();
        assert!(d.detect_all("The cat sat on the mat.").is_empty());
    }

    #[test]
    fn deterministic() {
        let d = detector();
        let text = "It appears to be unknown whether results could generalise.";
        assert_eq!(
            d.detect(text, SignalType::Uncertainty),
            d.detect(text, SignalType::Uncertainty)
        );
    }

    #[test]
    fn repeated_pattern_rejected_at_compile() {
        let mut banks = PatternBanks::default();
        banks.limitation = vec!["not evaluated".into(), "not evaluated".into()];
        assert!(matches!(
            SignalDetector::new(&banks),
            Err(PolicyError::DuplicatePattern {
                signal_type: SignalType::Limitation,
                ..
            })
        ));
    }

    #[test]
    fn invalid_pattern_rejected() {
        let mut banks = PatternBanks::default();
        banks.limitation = vec!["[".into()];
        assert!(matches!(
            SignalDetector::new(&banks),
            Err(PolicyError::BadPattern { .. })
        ));
    }
}
