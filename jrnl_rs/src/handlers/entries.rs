use tracing::debug;

use super::parse_export;
use crate::command::{SearchFilters, build_search_command};
use crate::error::Result;
use crate::executor::{Runner, execute};
use crate::types::{JournalEntry, SearchResult};

/// Filtered export, with every optional entry field defaulted.
pub async fn search_entries<R: Runner>(
    runner: &R,
    filters: &SearchFilters,
    journal: Option<&str>,
) -> Result<SearchResult> {
    let args = build_search_command(filters, journal);
    let cleaned = execute(runner, &args).await?;
    let payload = parse_export(&cleaned)?;
    debug!("search matched {} entries", payload.entries.len());

    Ok(SearchResult {
        entries: payload.entries.into_iter().map(JournalEntry::from).collect(),
        tags: payload.tags,
    })
}
