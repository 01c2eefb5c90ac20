//! Text normalization and lexical match metrics.

use std::collections::HashSet;

/// Lowercase, strip non-alphanumeric characters, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether two texts are equal after normalization.
pub fn exact_match(pred: &str, gt: &str) -> bool {
    normalize_text(pred) == normalize_text(gt)
}

/// Whether `pred` exactly matches any ground truth.
pub fn exact_match_any(pred: &str, ground_truths: &[String]) -> bool {
    let norm = normalize_text(pred);
    ground_truths.iter().any(|gt| normalize_text(gt) == norm)
}

fn token_set(text: &str) -> HashSet<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of normalized token sets; 0.0 if either set is empty.
pub fn jaccard_similarity(pred: &str, gt: &str) -> f64 {
    let a = token_set(pred);
    let b = token_set(gt);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

/// Best Jaccard similarity against any ground truth; 0.0 when there are none.
pub fn best_jaccard(pred: &str, ground_truths: &[String]) -> f64 {
    ground_truths
        .iter()
        .map(|gt| jaccard_similarity(pred, gt))
        .fold(0.0, f64::max)
}
