//! Parsers for jrnl's plain-text listings (`--tags`, `--list`).
//!
//! These formats are an unversioned contract with the jrnl CLI, so parsing is
//! tolerant: lines that do not match are collected in [`Listing::unmatched`]
//! instead of failing the whole call. Callers log them as contract drift.

use crate::normalize::{CONFIG_BANNER, EMPTY_EXPORT};
use crate::regexes::{regex_journal_line, regex_tag_line};
use crate::types::JournalInfo;

/// Parsed items plus the lines that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub unmatched: Vec<String>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            unmatched: Vec::new(),
        }
    }
}

fn is_known_filler(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed == EMPTY_EXPORT
}

/// Parse `@tag : count` lines in output order.
pub fn parse_tag_listing(output: &str) -> Listing<(String, u64)> {
    let mut listing = Listing::default();
    for line in output.trim().lines() {
        if is_known_filler(line) {
            continue;
        }
        let parsed = regex_tag_line().captures(line.trim()).and_then(|caps| {
            let count = caps[2].parse::<u64>().ok()?;
            Some((caps[1].to_string(), count))
        });
        match parsed {
            Some(item) => listing.items.push(item),
            None => listing.unmatched.push(line.to_string()),
        }
    }
    listing
}

/// Parse `[*] name -> path` lines; a leading `*` marks the default journal.
pub fn parse_journal_listing(output: &str) -> Listing<JournalInfo> {
    let mut listing = Listing::default();
    for line in output.trim().lines() {
        if is_known_filler(line) || line.contains(CONFIG_BANNER) {
            continue;
        }
        match regex_journal_line().captures(line) {
            Some(caps) => listing.items.push(JournalInfo {
                name: caps[2].trim().to_string(),
                path: caps[3].trim().to_string(),
                is_default: line.trim().starts_with('*'),
            }),
            None => listing.unmatched.push(line.to_string()),
        }
    }
    listing
}
