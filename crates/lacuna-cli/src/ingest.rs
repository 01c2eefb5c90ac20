//! Plain-text paper loading: pages, cleanup, section tags, paper ids.

use std::path::Path;

use anyhow::Context;
use lacuna_core::{Section, TextUnit};
use tracing::{debug, info};

/// Page separator in text exports of paginated documents.
const PAGE_BREAK: char = '\u{000C}';

/// First matching keyword decides the section. Checked in this order.
const SECTION_KEYWORDS: &[(Section, &[&str])] = &[
    (Section::Introduction, &["introduction", "background"]),
    (Section::Methods, &["method", "materials", "methodology"]),
    (Section::Results, &["result", "evaluation", "experiment"]),
    (Section::Discussion, &["discussion"]),
    (Section::Limitations, &["limitation", "future work", "constraints"]),
    (Section::Conclusion, &["conclusion", "summary"]),
];

/// `Paper A`, `Paper B`, ... by argument position; `Paper 27` onwards past Z.
pub fn paper_id(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Paper {}", char::from(b'A' + i)),
        _ => format!("Paper {}", index + 1),
    }
}

/// Collapse all whitespace runs, newlines included, to single spaces.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn detect_section(text: &str) -> Section {
    let lowered = text.to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(section, _)| *section)
        .unwrap_or_default()
}

/// Split raw text into cleaned, section-tagged units, one per non-empty page.
/// Page numbers count every page, empty ones included.
pub fn units_from_text(paper_id: &str, raw: &str) -> Vec<TextUnit> {
    raw.split(PAGE_BREAK)
        .enumerate()
        .filter_map(|(idx, page)| {
            let text = clean_text(page);
            if text.is_empty() {
                return None;
            }
            let page_number = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            let section = detect_section(&text);
            debug!(paper_id, page_number, %section, chars = text.len(), "loaded page");
            Some(TextUnit::new(paper_id, page_number, section, text))
        })
        .collect()
}

pub fn load_paper(paper_id: &str, path: &Path) -> anyhow::Result<Vec<TextUnit>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let units = units_from_text(paper_id, &raw);
    info!(paper_id, path = %path.display(), pages = units.len(), "ingested paper");
    Ok(units)
}

/// Load every paper in order, concatenating their units.
pub fn load_papers(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<TextUnit>> {
    let mut units = Vec::new();
    for (idx, path) in paths.iter().enumerate() {
        units.extend(load_paper(&paper_id(idx), path.as_ref())?);
    }
    Ok(units)
}
