//! In-process stand-in for the jrnl binary.
//!
//! Answers the same argument lists the command builder produces, in the same
//! text formats jrnl uses, so everything above the [`Runner`] seam behaves
//! identically with or without jrnl installed.

use std::future::Future;

use chrono::NaiveDate;

use super::{RunOutput, Runner};
use crate::command::{
    EXPORT_FLAG, JOURNAL_FLAG, LIST_FLAG, TAG_SIGIL, TAGS_FLAG, VERSION_FLAG, normalize_tag,
};
use crate::normalize::EMPTY_EXPORT;
use crate::types::{ExportPayload, RawEntry, TagCounts};

pub const FIXTURE_VERSION: &str = "jrnl version 4.2 (fixture)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureJournal {
    pub name: String,
    pub path: String,
    pub is_default: bool,
}

fn entry(date: &str, time: &str, title: &str, body: &str, tags: &[&str], starred: bool) -> RawEntry {
    RawEntry {
        date: Some(date.to_string()),
        time: Some(time.to_string()),
        title: Some(title.to_string()),
        body: Some(body.to_string()),
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        starred: Some(starred),
    }
}

/// Seven January 2024 entries, newest first.
pub fn fixture_entries() -> Vec<RawEntry> {
    vec![
        entry(
            "2024-01-15",
            "09:00",
            "Morning standup",
            "Discussed sprint goals with the team. @work @meeting",
            &["@work", "@meeting"],
            false,
        ),
        entry(
            "2024-01-15",
            "14:30",
            "Feature idea",
            "Search results could be grouped by week. @work @idea",
            &["@work", "@idea"],
            true,
        ),
        entry(
            "2024-01-14",
            "20:00",
            "Evening reflection",
            "Quiet day at home after a long walk. @personal",
            &["@personal"],
            false,
        ),
        entry(
            "2024-01-13",
            "10:00",
            "Weekly review",
            "Looked back at the week and planned the next one. @meeting",
            &["@meeting"],
            false,
        ),
        entry(
            "2024-01-12",
            "19:30",
            "Dinner with friends",
            "Tried the new ramen place downtown. @personal",
            &["@personal"],
            true,
        ),
        entry(
            "2024-01-11",
            "11:00",
            "Project kickoff",
            "Started working on the new MCP integration project. @work",
            &["@work"],
            false,
        ),
        entry(
            "2024-01-10",
            "21:15",
            "Reading notes",
            "Finished two chapters of the systems book. @personal",
            &["@personal"],
            false,
        ),
    ]
}

pub fn fixture_journals() -> Vec<FixtureJournal> {
    [
        ("default", "/home/user/journal.txt", true),
        ("work", "/home/user/work.txt", false),
        ("personal", "/home/user/personal.txt", false),
    ]
    .into_iter()
    .map(|(name, path, is_default)| FixtureJournal {
        name: name.to_string(),
        path: path.to_string(),
        is_default,
    })
    .collect()
}

/// Filters recognised in a `--export json` argument list.
#[derive(Debug, Default)]
struct ExportQuery {
    tags: Vec<String>,
    all_tags: bool,
    starred: bool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    contains: Option<String>,
    limit: Option<usize>,
}

/// Non-ISO bounds ("yesterday") are accepted by jrnl but ignored here.
fn iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

impl ExportQuery {
    fn parse(args: &[String]) -> Self {
        let mut query = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-from" => query.from = iter.next().and_then(|v| iso_date(v)),
                "-to" => query.to = iter.next().and_then(|v| iso_date(v)),
                "-contains" => query.contains = iter.next().map(|v| v.to_lowercase()),
                "-n" => query.limit = iter.next().and_then(|v| v.parse().ok()),
                "-starred" => query.starred = true,
                "-and" => query.all_tags = true,
                JOURNAL_FLAG => {
                    iter.next();
                }
                tag if tag.starts_with(TAG_SIGIL) => query.tags.push(tag.to_lowercase()),
                // Positional journal name, `--export`, `json`.
                _ => {}
            }
        }
        query
    }

    fn has_tag(entry: &RawEntry, wanted: &str) -> bool {
        entry
            .tags
            .iter()
            .flatten()
            .any(|t| normalize_tag(t).eq_ignore_ascii_case(wanted))
    }

    fn matches(&self, entry: &RawEntry) -> bool {
        if !self.tags.is_empty() {
            let hit = if self.all_tags {
                self.tags.iter().all(|t| Self::has_tag(entry, t))
            } else {
                self.tags.iter().any(|t| Self::has_tag(entry, t))
            };
            if !hit {
                return false;
            }
        }
        if self.starred && !entry.starred.unwrap_or(false) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = entry.date.as_deref().and_then(iso_date) else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        if let Some(needle) = &self.contains {
            let title = entry.title.as_deref().unwrap_or_default().to_lowercase();
            let body = entry.body.as_deref().unwrap_or_default().to_lowercase();
            if !title.contains(needle) && !body.contains(needle) {
                return false;
            }
        }
        true
    }
}

/// Tag counts in first-seen order.
fn count_tags(entries: &[RawEntry]) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    for tag in entries.iter().flat_map(|e| e.tags.iter().flatten()) {
        let tag = normalize_tag(tag);
        match counts.iter_mut().find(|(seen, _)| *seen == tag) {
            Some((_, n)) => *n += 1,
            None => counts.push((tag, 1)),
        }
    }
    counts
}

#[derive(Debug, Clone)]
pub struct FixtureRunner {
    entries: Vec<RawEntry>,
    journals: Vec<FixtureJournal>,
}

impl Default for FixtureRunner {
    fn default() -> Self {
        Self {
            entries: fixture_entries(),
            journals: fixture_journals(),
        }
    }
}

impl FixtureRunner {
    /// Same journals, different entries.
    pub fn with_entries(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    fn export(&self, args: &[String]) -> String {
        let query = ExportQuery::parse(args);
        let mut selected: Vec<RawEntry> = self
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        if let Some(n) = query.limit {
            selected.truncate(n);
        }
        if selected.is_empty() {
            return "no entries found".to_string();
        }

        let payload = ExportPayload {
            tags: count_tags(&selected).into_iter().collect::<TagCounts>(),
            entries: selected,
        };
        let json = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| EMPTY_EXPORT.to_string());
        let noun = if payload.entries.len() == 1 { "entry" } else { "entries" };
        format!("{} {noun} found\n{json}\n", payload.entries.len())
    }

    fn tags(&self) -> String {
        let mut counts = count_tags(&self.entries);
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let width = counts.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
        counts
            .iter()
            .map(|(tag, n)| format!("{tag:<width$} : {n}\n"))
            .collect()
    }

    fn list(&self) -> String {
        let width = self.journals.iter().map(|j| j.name.len()).max().unwrap_or(0);
        let mut out = String::from("Journals defined in config (/home/user/.config/jrnl/jrnl.yaml)\n");
        for journal in &self.journals {
            let marker = if journal.is_default { '*' } else { ' ' };
            out.push_str(&format!(
                " {marker} {:<width$} -> {}\n",
                journal.name, journal.path
            ));
        }
        out
    }

    fn respond(&self, args: &[String]) -> RunOutput {
        let has = |flag: &str| args.iter().any(|a| a == flag);
        if has(VERSION_FLAG) {
            RunOutput::ok(format!("{FIXTURE_VERSION}\n"))
        } else if has(LIST_FLAG) {
            RunOutput::ok(self.list())
        } else if has(TAGS_FLAG) {
            RunOutput::ok(self.tags())
        } else if has(EXPORT_FLAG) {
            RunOutput::ok(self.export(args))
        } else {
            // Bare invocation: everything, as an export.
            RunOutput::ok(self.export(&[]))
        }
    }
}

impl Runner for FixtureRunner {
    fn run(&self, args: &[String]) -> impl Future<Output = RunOutput> + Send {
        let output = self.respond(args);
        async move { output }
    }
}
