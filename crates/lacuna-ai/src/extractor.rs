//! One bounded generation call per signal.

use std::ops::AddAssign;
use std::time::Duration;

use lacuna_core::{Question, Signal};
use tracing::{debug, warn};

use crate::generator::{GenerationOutcome, QuestionGenerator};
use crate::prompt::build_question_prompt;

/// Outcome counts for a batch of generation calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub requested: usize,
    pub generated: usize,
    pub no_question: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl AddAssign for GenerationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.requested += rhs.requested;
        self.generated += rhs.generated;
        self.no_question += rhs.no_question;
        self.failed += rhs.failed;
        self.timed_out += rhs.timed_out;
    }
}

/// Generate at most one question per signal, in order.
///
/// Question ids run from `first_id` by signal position, so a discarded signal
/// leaves a gap. Errors, timeouts and sentinel responses all discard the
/// signal; nothing is retried.
pub async fn extract_questions<G: QuestionGenerator + ?Sized>(
    signals: &[Signal],
    first_id: u32,
    generator: &G,
    timeout: Duration,
) -> (Vec<Question>, GenerationStats) {
    let mut questions = Vec::with_capacity(signals.len());
    let mut stats = GenerationStats::default();

    for (offset, signal) in signals.iter().enumerate() {
        let question_id = first_id.saturating_add(offset as u32);
        stats.requested += 1;

        let prompt = build_question_prompt(signal);
        let response = match tokio::time::timeout(timeout, generator.generate(&prompt)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(
                    paper_id = %signal.paper_id,
                    page_number = signal.page_number,
                    signal_type = %signal.signal_type,
                    error = %e,
                    "generation failed, discarding signal"
                );
                stats.failed += 1;
                continue;
            }
            Err(_) => {
                warn!(
                    paper_id = %signal.paper_id,
                    page_number = signal.page_number,
                    signal_type = %signal.signal_type,
                    timeout_secs = timeout.as_secs_f64(),
                    "generation timed out, discarding signal"
                );
                stats.timed_out += 1;
                continue;
            }
        };

        match GenerationOutcome::from_response(&response) {
            GenerationOutcome::Question(content) => {
                stats.generated += 1;
                questions.push(Question::from_signal(question_id, signal, content));
            }
            GenerationOutcome::NoQuestion => {
                debug!(
                    paper_id = %signal.paper_id,
                    page_number = signal.page_number,
                    "no valid question for signal"
                );
                stats.no_question += 1;
            }
        }
    }

    (questions, stats)
}
