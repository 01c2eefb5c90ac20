//! Fixed prompt template for deriving one question from one signal.

use lacuna_core::{NO_VALID_QUESTION, Signal};

const INSTRUCTIONS: &str = "\
You are a research assistant.

Your task:
- Derive exactly ONE unanswered research question.
- The question must arise ONLY from the provided evidence.
- The question must be specific and non-generic.
- Do NOT summarize the paper.
- Do NOT propose solutions.
- Do NOT invent new context.
- Do NOT discuss impact in broad or survey terms.";

/// Build the generation prompt for a single signal.
pub fn build_question_prompt(signal: &Signal) -> String {
    format!(
        "{INSTRUCTIONS}\n\
         \n\
         Evidence signal:\n\
         - Signal type: {signal_type}\n\
         - Paper: {paper_id}\n\
         - Page: {page_number}\n\
         - Section: {section}\n\
         \n\
         Excerpt:\n\
         \"\"\"{excerpt}\"\"\"\n\
         \n\
         Respond in the following strict format.\n\
         Do NOT add headings, markdown, or extra text.\n\
         \n\
         QUESTION: <one clear, specific research question in a single sentence>\n\
         WHY: <one or two sentences explaining why this question exists based only on the evidence>\n\
         MISSING: <what data, experiment, comparison, or evaluation is missing>\n\
         \n\
         If no valid unanswered research question can be derived from this evidence,\n\
         respond with exactly:\n\
         {NO_VALID_QUESTION}",
        signal_type = signal.signal_type,
        paper_id = signal.paper_id,
        page_number = signal.page_number,
        section = signal.section,
        excerpt = signal.text_excerpt,
    )
}
