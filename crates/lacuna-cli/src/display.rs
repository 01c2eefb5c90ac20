//! Plain-text rendering for questions, signal audits and evaluation reports.

use chrono::{DateTime, Utc};
use lacuna_core::{Question, ScoredSignal};
use lacuna_eval::{Comparison, Evaluation};

pub const NO_QUESTIONS: &str = "No strong unanswered questions detected from the provided papers.";

const EXCERPT_PREVIEW_CHARS: usize = 80;
const RULE: &str = "==============================";
const THIN_RULE: &str = "------------------------------";

// ── Questions ──

/// One block per question: content, blank line, `Source:`, citation.
pub fn render_question(question: &Question) -> String {
    format!(
        "{}\n\nSource:\n{}",
        question.content.trim(),
        question.citation()
    )
}

/// All questions separated by blank lines, or the fixed empty-result line.
pub fn render_questions(questions: &[Question]) -> String {
    if questions.is_empty() {
        return NO_QUESTIONS.to_string();
    }
    questions
        .iter()
        .map(render_question)
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Signal audit ──

/// Table of retained signals with the three contributions behind each score.
pub fn render_signals(signals: &[ScoredSignal]) -> String {
    if signals.is_empty() {
        return "No signals met the minimum score.".to_string();
    }

    let mut out = format!(
        "{:<10} {:>4}  {:<12} {:<13} {:>5} {:>4} {:>4} {:>5}  {}\n",
        "paper", "page", "type", "section", "type", "pats", "sect", "score", "excerpt"
    );
    for scored in signals {
        let s = &scored.signal;
        let b = &scored.breakdown;
        out.push_str(&format!(
            "{:<10} {:>4}  {:<12} {:<13} {:>5} {:>4} {:>4} {:>5}  {}\n",
            s.paper_id,
            s.page_number,
            s.signal_type.as_str(),
            s.section.as_str(),
            b.type_weight,
            b.pattern_count,
            b.section_weight,
            s.score,
            preview(&s.text_excerpt)
        ));
        out.push_str(&format!(
            "{:<10} {:>4}  matched: {}\n",
            "",
            "",
            s.matched_patterns.join(", ")
        ));
    }
    out.push_str(&format!("{} signals retained", signals.len()));
    out
}

fn preview(text: &str) -> String {
    if text.chars().count() <= EXCERPT_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_PREVIEW_CHARS - 3).collect();
    format!("{cut}...")
}

// ── Evaluation ──

/// `exact_match` -> `Exact Match`.
fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_evaluation(out: &mut String, heading: &str, eval: &Evaluation) {
    out.push_str(&format!("\n{heading}\n"));
    for (name, value) in eval.report.entries() {
        out.push_str(&format!("{:<22} {value:.3}\n", format!("{}:", title_case(name))));
    }
}

/// Primary and baseline reports with the threshold and coverage counts.
pub fn render_comparison(
    comparison: &Comparison,
    threshold: f64,
    similarity: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let primary = &comparison.primary;
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\nEvaluation Report\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Generated:          {}\n", generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out.push_str(&format!("Semantic Threshold: {threshold}\n"));
    out.push_str(&format!("Similarity:         {similarity}\n"));
    out.push_str(&format!(
        "Papers evaluated:   {} ({} predictions)\n",
        primary.papers_evaluated, primary.predictions_evaluated
    ));
    out.push_str(&format!("Papers skipped:     {}\n", primary.skipped_papers.len()));
    if !primary.skipped_papers.is_empty() {
        out.push_str(&format!("  no predictions for: {}\n", primary.skipped_papers.join(", ")));
    }
    if !primary.unbenchmarked_papers.is_empty() {
        out.push_str(&format!(
            "  not in benchmark:    {}\n",
            primary.unbenchmarked_papers.join(", ")
        ));
    }
    out.push_str(THIN_RULE);
    out.push('\n');

    render_evaluation(&mut out, "LLM SYSTEM", primary);
    render_evaluation(&mut out, "BASELINE (Heuristic)", &comparison.baseline);
    out.push_str(RULE);
    out
}
