//! Fixed instruction text and request assembly.

use deck_core::{PromptPart, SlideRecord};

/// Sentence the model must return when nothing is found.
pub const NO_FINDINGS_SENTENCE: &str =
    "No significant factual or logical inconsistencies were found.";

/// First part of every request.
pub const LEADING_INSTRUCTION: &str =
    "Analyze the following presentation content for inconsistencies based on your instructions.";

pub const TEXT_LABEL: &str = "TEXT:";
pub const IMAGES_LABEL: &str = "IMAGES:";

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = r#"You are a highly logical and detail-oriented analysis agent. Your function is to meticulously review the content of any multi-slide presentation and identify factual, logical, or internal inconsistencies.

Your instructions are to perform a rigorous, slide-by-slide comparison and identify any contradictions or errors, including but not limited to:

**1. Factual & Numerical Inconsistencies:**
- **Conflicting Data:** A number, date, name, or statistic on one slide contradicts information on another slide. (e.g., Slide 2 states an event happened in 1995, but Slide 10 refers to the same event as happening in 1996).
- **Calculation Errors:** Numbers in a table do not sum up correctly, or percentages presented do not add up to 100%.
- **Inconsistent Terminology:** The same concept or item is referred to by different names across slides, causing confusion (e.g., "Subject A" on one slide is called "Test Group Alpha" on another).

**2. Logical & Thematic Inconsistencies:**
- **Contradictory Claims:** A statement or argument on one slide is logically at odds with a statement on another. (e.g., Slide 3 claims "solar power is ineffective in this region," while Slide 8 proposes a solar-powered solution).
- **Timeline Mismatches:** The sequence of events described or shown in a timeline is not logical or conflicts with dates mentioned elsewhere.
- **Causal Errors:** A cause-and-effect relationship is described illogically (e.g., claiming an event from 2020 caused an outcome in 2018).

**Output Format:**
Provide your findings as a clear, structured list. For each issue found, you MUST provide:
- The slide numbers involved.
- The category of the inconsistency (e.g., "Factual Contradiction", "Logical Mismatch", "Timeline Mismatches", "Calculation Errors").
- A concise description of the problem.

If you find no inconsistencies after a thorough review, you must state: "No significant factual or logical inconsistencies were found.""#;

/// Header part that opens a slide's section.
pub fn slide_header(slide_number: usize) -> String {
    format!("--- SLIDE {} ---", slide_number)
}

/// Build the ordered request parts for a deck.
///
/// The leading instruction comes first, then for each record: its header,
/// `TEXT:` and the text when the text is non-empty, `IMAGES:` and every image
/// when there are images. Records are emitted in the order given.
pub fn assemble_request(records: &[SlideRecord]) -> Vec<PromptPart> {
    let mut parts = vec![PromptPart::text(LEADING_INSTRUCTION)];

    for record in records {
        parts.push(PromptPart::Text(slide_header(record.slide_number)));

        if !record.text.is_empty() {
            parts.push(PromptPart::text(TEXT_LABEL));
            parts.push(PromptPart::text(record.text.as_str()));
        }

        if !record.images.is_empty() {
            parts.push(PromptPart::text(IMAGES_LABEL));
            parts.extend(record.images.iter().cloned().map(PromptPart::Image));
        }
    }

    parts
}
