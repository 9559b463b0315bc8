//! Cleanup of jrnl's human-formatted stdout.
//!
//! jrnl wraps some output in box-drawing borders, prints "N entries found"
//! summaries and config banners, and may surround a JSON export with prose.
//! [`normalize_output`] strips all of that and never fails: text it cannot
//! reduce to JSON is returned as-is and the caller's JSON parse reports it.

use crate::regexes::regex_entry_summary;

/// Canonical payload substituted when jrnl found nothing.
pub const EMPTY_EXPORT: &str = r#"{"tags": {}, "entries": []}"#;

const NO_ENTRIES_MARKER: &str = "no entries found";
pub(crate) const CONFIG_BANNER: &str = "Journals defined in config";

/// U+2500..U+257F, the Box Drawing block.
fn is_box_char(c: char) -> bool {
    ('\u{2500}'..='\u{257F}').contains(&c)
}

/// Line content with surrounding whitespace and border glyphs removed.
fn framed_text(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || is_box_char(c))
}

/// True for lines that carry no payload: borders, blanks, summaries, banners.
pub fn is_decoration(line: &str) -> bool {
    let inner = framed_text(line);
    inner.is_empty()
        || regex_entry_summary().is_match(inner)
        || line.trim_start().starts_with(CONFIG_BANNER)
}

/// Strip decoration and recover the JSON region, or the canonical empty export.
pub fn normalize_output(raw: &str) -> String {
    let cleaned = raw
        .lines()
        .filter(|line| !is_decoration(line))
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = cleaned.trim();

    if raw.contains(NO_ENTRIES_MARKER) || cleaned.is_empty() {
        return EMPTY_EXPORT.to_string();
    }

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}'))
        && start < end
    {
        return cleaned[start..=end].to_string();
    }

    cleaned.to_string()
}
