use std::sync::OnceLock;

use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

/// `3 entries found`, `1 entry found`, `no entries found`.
pub(crate) fn regex_entry_summary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"(?i)^(?:\d+|no) entr(?:y|ies) found$"))
}

/// `@tag : count` from `jrnl --tags`.
pub(crate) fn regex_tag_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"^(@\w+)\s*:\s*(\d+)$"))
}

/// `[*] name -> path` from `jrnl --list`.
pub(crate) fn regex_journal_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"^(\s*\*?\s*)(\w+)\s*->\s*(.+)$"))
}
