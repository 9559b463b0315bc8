//! Data shapes exchanged with jrnl and returned to clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag name (with `@` sigil) to number of entries carrying it.
pub type TagCounts = BTreeMap<String, u64>;

/// One record of `jrnl --export json`, as loose as jrnl emits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub starred: Option<bool>,
}

/// Top-level `jrnl --export json` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    #[serde(default)]
    pub tags: TagCounts,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

/// A journal entry with every optional field resolved to a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: String,
    pub time: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub starred: bool,
}

impl From<RawEntry> for JournalEntry {
    fn from(raw: RawEntry) -> Self {
        Self {
            date: raw.date.unwrap_or_default(),
            time: raw.time.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            body: raw.body.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            starred: raw.starred.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalInfo {
    pub name: String,
    pub path: String,
    pub is_default: bool,
}

/// Per-period bucket of the statistics breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeGroupStats {
    pub period: String,
    pub entry_count: u64,
    pub word_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalStatistics {
    pub total_entries: u64,
    pub total_words: u64,
    pub average_words_per_entry: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_grouping: Option<Vec<TimeGroupStats>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_tags: Option<Vec<TagCount>>,
}

/// Number of entries carrying both tags of an unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCooccurrence {
    pub tag1: String,
    pub tag2: String,
    pub count: u64,
}

// ============================================================================
// Operation results
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entries: Vec<JournalEntry>,
    pub tags: TagCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagsResult {
    pub tags: TagCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CooccurrenceResult {
    pub cooccurrences: Vec<TagCooccurrence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    pub statistics: JournalStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalsResult {
    pub journals: Vec<JournalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_journal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetJournalResult {
    pub success: bool,
    pub current_journal: String,
}
