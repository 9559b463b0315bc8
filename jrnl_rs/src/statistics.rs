//! In-process aggregation over exported entries.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};

use crate::command::normalize_tag;
use crate::types::{JournalEntry, JournalStatistics, TagCount, TimeGroupStats};

pub const TOP_TAG_LIMIT: usize = 10;
pub const UNKNOWN_PERIOD: &str = "unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeGrouping {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl TimeGrouping {
    /// Unrecognised keys group by day.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "week" => TimeGrouping::Week,
            "month" => TimeGrouping::Month,
            "year" => TimeGrouping::Year,
            _ => TimeGrouping::Day,
        }
    }

    /// Bucket label: `2024-01-15`, `2024-W03`, `2024-01` or `2024`.
    pub fn period(self, date: &str) -> String {
        let Some(date) = parse_entry_date(date) else {
            return UNKNOWN_PERIOD.to_string();
        };
        match self {
            TimeGrouping::Day => date.format("%Y-%m-%d").to_string(),
            TimeGrouping::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            TimeGrouping::Month => date.format("%Y-%m").to_string(),
            TimeGrouping::Year => date.format("%Y").to_string(),
        }
    }
}

/// jrnl exports `YYYY-MM-DD`; anything after the first ten bytes is ignored.
fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Whitespace-separated tokens in title plus body.
pub fn word_count(entry: &JournalEntry) -> u64 {
    (entry.title.split_whitespace().count() + entry.body.split_whitespace().count()) as u64
}

fn average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (total as f64 / count as f64).round() as u64
}

fn group_by_period(entries: &[JournalEntry], grouping: TimeGrouping) -> Vec<TimeGroupStats> {
    let mut buckets: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for entry in entries {
        let bucket = buckets.entry(grouping.period(&entry.date)).or_default();
        bucket.0 += 1;
        bucket.1 += word_count(entry);
    }
    buckets
        .into_iter()
        .map(|(period, (entry_count, word_count))| TimeGroupStats {
            period,
            entry_count,
            word_count,
        })
        .collect()
}

/// Most frequent tags; equal counts keep first-seen order.
pub fn top_tags(entries: &[JournalEntry], limit: usize) -> Vec<TagCount> {
    let mut ranked: Vec<TagCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for tag in entries.iter().flat_map(|e| e.tags.iter()) {
        let tag = normalize_tag(tag);
        match index.get(&tag) {
            Some(&i) => ranked[i].count += 1,
            None => {
                index.insert(tag.clone(), ranked.len());
                ranked.push(TagCount { tag, count: 1 });
            }
        }
    }
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

pub fn compute_statistics(
    entries: &[JournalEntry],
    grouping: Option<TimeGrouping>,
    include_top_tags: bool,
) -> JournalStatistics {
    let total_entries = entries.len() as u64;
    let total_words: u64 = entries.iter().map(word_count).sum();

    JournalStatistics {
        total_entries,
        total_words,
        average_words_per_entry: average(total_words, total_entries),
        time_grouping: grouping.map(|g| group_by_period(entries, g)),
        top_tags: include_top_tags.then(|| top_tags(entries, TOP_TAG_LIMIT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, title: &str, body: &str, tags: &[&str]) -> JournalEntry {
        JournalEntry {
            date: date.into(),
            title: title.into(),
            body: body.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_journal_has_zero_average() {
        let stats = compute_statistics(&[], None, false);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_words, 0);
        assert_eq!(stats.average_words_per_entry, 0);
        assert!(stats.time_grouping.is_none());
        assert!(stats.top_tags.is_none());
    }

    #[test]
    fn words_split_on_whitespace_runs() {
        let e = entry("2024-01-11", "Project kickoff", "Started  working\n\ton it. @work", &[]);
        assert_eq!(word_count(&e), 2 + 5);
    }

    #[test]
    fn average_is_rounded() {
        let entries = [
            entry("2024-01-01", "", "one two", &[]),
            entry("2024-01-02", "", "one two three", &[]),
        ];
        // 5 / 2 = 2.5
        assert_eq!(compute_statistics(&entries, None, false).average_words_per_entry, 3);
    }

    #[test]
    fn grouping_keys() {
        assert_eq!(TimeGrouping::from_key("week"), TimeGrouping::Week);
        assert_eq!(TimeGrouping::from_key("YEAR"), TimeGrouping::Year);
        assert_eq!(TimeGrouping::from_key("fortnight"), TimeGrouping::Day);
    }

    #[test]
    fn period_labels() {
        assert_eq!(TimeGrouping::Day.period("2024-01-15"), "2024-01-15");
        assert_eq!(TimeGrouping::Week.period("2024-01-15"), "2024-W03");
        assert_eq!(TimeGrouping::Week.period("2024-01-14"), "2024-W02");
        assert_eq!(TimeGrouping::Month.period("2024-01-15"), "2024-01");
        assert_eq!(TimeGrouping::Year.period("2024-01-15 09:00"), "2024");
        assert_eq!(TimeGrouping::Year.period("someday"), UNKNOWN_PERIOD);
    }

    #[test]
    fn iso_week_year_differs_from_calendar_year() {
        assert_eq!(TimeGrouping::Week.period("2024-12-30"), "2025-W01");
        assert_eq!(TimeGrouping::Week.period("2021-01-01"), "2020-W53");
    }

    #[test]
    fn buckets_are_sorted_and_sum_words() {
        let entries = [
            entry("2024-02-03", "b", "x y", &[]),
            entry("2024-01-15", "a", "x", &[]),
            entry("2024-02-01", "c", "", &[]),
        ];
        let stats = compute_statistics(&entries, Some(TimeGrouping::Month), false);
        assert_eq!(
            stats.time_grouping.unwrap(),
            vec![
                TimeGroupStats {
                    period: "2024-01".into(),
                    entry_count: 1,
                    word_count: 2,
                },
                TimeGroupStats {
                    period: "2024-02".into(),
                    entry_count: 2,
                    word_count: 4,
                },
            ]
        );
    }

    #[test]
    fn top_tags_rank_with_first_seen_ties() {
        let entries = [
            entry("2024-01-01", "", "", &["personal", "@work"]),
            entry("2024-01-02", "", "", &["@work", "@idea"]),
            entry("2024-01-03", "", "", &["@idea", "@personal"]),
        ];
        let ranked = top_tags(&entries, TOP_TAG_LIMIT);
        let names: Vec<_> = ranked.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, ["@personal", "@work", "@idea"]);
        assert!(ranked.iter().all(|t| t.count == 2));
    }

    #[test]
    fn top_tags_truncate_to_limit() {
        let tags: Vec<String> = (0..15).map(|i| format!("@t{i}")).collect();
        let refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let entries = [entry("2024-01-01", "", "", &refs)];
        assert_eq!(top_tags(&entries, TOP_TAG_LIMIT).len(), 10);
    }
}
