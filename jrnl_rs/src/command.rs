//! Argument builders for jrnl invocations.
//!
//! Pure functions: the same filters always produce the same token list.
//! Date strings are passed through verbatim (jrnl understands natural
//! language like "yesterday" or "last monday"), so nothing here validates them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const TAG_SIGIL: char = '@';

pub const EXPORT_FLAG: &str = "--export";
pub const EXPORT_FORMAT: &str = "json";
pub const TAGS_FLAG: &str = "--tags";
pub const LIST_FLAG: &str = "--list";
pub const VERSION_FLAG: &str = "--version";
pub const JOURNAL_FLAG: &str = "--journal";

/// How multiple tags combine when filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    /// Entries carrying any of the tags (jrnl default).
    #[default]
    Or,
    /// Entries carrying every tag (`-and`).
    And,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub from: Option<String>,
    pub to: Option<String>,
    pub tags: Vec<String>,
    pub tag_mode: Option<TagMode>,
    pub contains: Option<String>,
    pub limit: Option<u64>,
    pub starred: bool,
}

/// Prefix a tag with `@` unless it already has one. Idempotent.
pub fn normalize_tag(tag: &str) -> String {
    if tag.starts_with(TAG_SIGIL) {
        tag.to_string()
    } else {
        format!("{TAG_SIGIL}{tag}")
    }
}

fn push_journal(args: &mut Vec<String>, journal: Option<&str>) {
    if let Some(name) = journal.filter(|j| !j.is_empty()) {
        args.push(name.to_string());
    }
}

fn push_export(args: &mut Vec<String>) {
    args.push(EXPORT_FLAG.to_string());
    args.push(EXPORT_FORMAT.to_string());
}

/// `[journal] [-from D] [-to D] [@tag..] [-and] [-contains T] [-n N] [-starred] --export json`
pub fn build_search_command(filters: &SearchFilters, journal: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    push_journal(&mut args, journal);

    if let Some(from) = filters.from.as_deref().filter(|s| !s.is_empty()) {
        args.push("-from".to_string());
        args.push(from.to_string());
    }
    if let Some(to) = filters.to.as_deref().filter(|s| !s.is_empty()) {
        args.push("-to".to_string());
        args.push(to.to_string());
    }

    args.extend(filters.tags.iter().map(|t| normalize_tag(t)));
    if filters.tag_mode == Some(TagMode::And) && filters.tags.len() > 1 {
        args.push("-and".to_string());
    }

    if let Some(text) = filters.contains.as_deref().filter(|s| !s.is_empty()) {
        args.push("-contains".to_string());
        args.push(text.to_string());
    }
    // Zero means "no limit".
    if let Some(limit) = filters.limit.filter(|n| *n > 0) {
        args.push("-n".to_string());
        args.push(limit.to_string());
    }
    if filters.starred {
        args.push("-starred".to_string());
    }

    push_export(&mut args);
    args
}

pub fn build_tag_command(journal: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    push_journal(&mut args, journal);
    args.push(TAGS_FLAG.to_string());
    args
}

/// Statistics are computed in-process from a full export.
pub fn build_stats_command(journal: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    push_journal(&mut args, journal);
    push_export(&mut args);
    args
}

pub fn build_list_journals_command() -> Vec<String> {
    vec![LIST_FLAG.to_string()]
}

pub fn build_version_command() -> Vec<String> {
    vec![VERSION_FLAG.to_string()]
}

/// Prepend `--journal <name>` when an override is configured.
pub fn with_journal_override(args: &[String], journal: Option<&str>) -> Vec<String> {
    match journal.filter(|j| !j.is_empty()) {
        Some(name) => {
            let mut full = Vec::with_capacity(args.len() + 2);
            full.push(JOURNAL_FLAG.to_string());
            full.push(name.to_string());
            full.extend_from_slice(args);
            full
        }
        None => args.to_vec(),
    }
}
