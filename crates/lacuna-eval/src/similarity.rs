//! The injected semantic similarity function.
//!
//! The harness relies only on the contract: `(text, text) -> [0, 1]`,
//! symmetric, 1.0 for identical strings. Any closure with that shape
//! qualifies.

use crate::metrics::jaccard_similarity;

pub trait SemanticSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f32;
}

impl<F> SemanticSimilarity for F
where
    F: Fn(&str, &str) -> f32,
{
    fn similarity(&self, a: &str, b: &str) -> f32 {
        self(a, b)
    }
}

/// Lexical stand-in for an embedding model: token Jaccard, with identical
/// strings scoring 1.0 even when they normalize to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl SemanticSimilarity for TokenJaccard {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        if a == b {
            return 1.0;
        }
        jaccard_similarity(a, b) as f32
    }
}

/// Best similarity of `pred` against any ground truth, clamped to [0, 1].
/// Non-finite values count as 0.
pub fn best_semantic_match<S: SemanticSimilarity + ?Sized>(
    similarity: &S,
    pred: &str,
    ground_truths: &[String],
) -> f64 {
    ground_truths
        .iter()
        .map(|gt| {
            let s = f64::from(similarity.similarity(pred, gt));
            if s.is_finite() { s.clamp(0.0, 1.0) } else { 0.0 }
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_similarity_functions() {
        let constant = |_: &str, _: &str| 0.5f32;
        assert_eq!(constant.similarity("a", "b"), 0.5);
    }

    #[test]
    fn token_jaccard_contract() {
        let s = TokenJaccard;
        assert_eq!(s.similarity("What?", "What?"), 1.0);
        assert_eq!(s.similarity("", ""), 1.0);
        assert_eq!(s.similarity("a b", "b a"), s.similarity("b a", "a b"));
        assert_eq!(s.similarity("a b", "c d"), 0.0);
    }

    #[test]
    fn best_match_clamps_and_ignores_nan() {
        let gts = vec!["x".to_string(), "y".to_string()];
        let wild = |_: &str, gt: &str| if gt == "x" { 1.7f32 } else { -0.3 };
        assert_eq!(best_semantic_match(&wild, "p", &gts), 1.0);

        let nan = |_: &str, _: &str| f32::NAN;
        assert_eq!(best_semantic_match(&nan, "p", &gts), 0.0);

        assert_eq!(best_semantic_match(&TokenJaccard, "p", &[]), 0.0);
    }
}
