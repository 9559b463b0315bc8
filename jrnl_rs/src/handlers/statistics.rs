use super::parse_export;
use crate::command::build_stats_command;
use crate::error::Result;
use crate::executor::{Runner, execute};
use crate::statistics::{TimeGrouping, compute_statistics};
use crate::types::{JournalEntry, StatisticsResult};

/// Full export of the journal, aggregated in-process.
pub async fn get_statistics<R: Runner>(
    runner: &R,
    journal: Option<&str>,
    grouping: Option<TimeGrouping>,
    include_top_tags: bool,
) -> Result<StatisticsResult> {
    let cleaned = execute(runner, &build_stats_command(journal)).await?;
    let entries: Vec<JournalEntry> = parse_export(&cleaned)?
        .entries
        .into_iter()
        .map(JournalEntry::from)
        .collect();

    Ok(StatisticsResult {
        statistics: compute_statistics(&entries, grouping, include_top_tags),
    })
}
