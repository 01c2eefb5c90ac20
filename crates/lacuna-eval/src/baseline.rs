//! Template baseline: one fixed-form question per signal, no generation.

use lacuna_core::{QuestionRecord, Signal, SignalType};

use crate::dataset::Predictions;

const SNIPPET_WORDS: usize = 15;

/// Template question over the first words of `excerpt`.
pub fn baseline_question(signal_type: SignalType, excerpt: &str) -> String {
    let snippet = excerpt
        .split_whitespace()
        .take(SNIPPET_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    let snippet = snippet.trim_end_matches(['.', ',', ';', ':', '?', '!']);
    match signal_type {
        SignalType::Limitation => format!("What limitation exists regarding: {snippet}?"),
        SignalType::Uncertainty => format!("What remains unclear about: {snippet}?"),
        SignalType::Assumption => format!("What assumption is being made about: {snippet}?"),
    }
}

/// Rebuild baseline predictions from a stored results document, without
/// re-reading the papers. Uses each record's evidence, or its question text
/// when the record predates the evidence field.
pub fn reconstruct_baseline(records: &[QuestionRecord]) -> Predictions {
    let mut predictions = Predictions::new();
    for record in records {
        let excerpt = record.evidence.as_deref().unwrap_or(&record.question);
        predictions.push(
            record.paper_id.clone(),
            baseline_question(record.signal_type, excerpt),
        );
    }
    predictions
}

/// Baseline predictions straight from scored signals.
pub fn baseline_from_signals(signals: &[Signal]) -> Predictions {
    let mut predictions = Predictions::new();
    for signal in signals {
        predictions.push(
            signal.paper_id.clone(),
            baseline_question(signal.signal_type, &signal.text_excerpt),
        );
    }
    predictions
}
