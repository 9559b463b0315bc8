use tracing::{debug, warn};

use super::parse_export;
use crate::command::{
    SearchFilters, TagMode, build_search_command, build_tag_command, normalize_tag,
};
use crate::error::Result;
use crate::executor::{Runner, execute};
use crate::listing::parse_tag_listing;
use crate::types::{CooccurrenceResult, TagCooccurrence, TagCounts, TagsResult};

pub async fn list_tags<R: Runner>(runner: &R, journal: Option<&str>) -> Result<TagsResult> {
    let cleaned = execute(runner, &build_tag_command(journal)).await?;
    let listing = parse_tag_listing(&cleaned);
    for line in &listing.unmatched {
        warn!("Unrecognized tag listing line: {:?}", line);
    }
    Ok(TagsResult {
        tags: listing.items.into_iter().collect::<TagCounts>(),
    })
}

/// Normalized tags with duplicates removed, first occurrence kept.
fn distinct_tags(tags: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        let tag = normalize_tag(tag);
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Pairwise co-occurrence: one `-and` search per unordered pair.
///
/// Fewer than two distinct tags yields an empty result without running jrnl.
/// Runner failures abort the whole analysis. A pair whose output does not
/// parse is logged and skipped; zero counts are omitted.
pub async fn analyze_tag_cooccurrence<R: Runner>(
    runner: &R,
    tags: &[String],
    journal: Option<&str>,
) -> Result<CooccurrenceResult> {
    let tags = distinct_tags(tags);
    let mut cooccurrences = Vec::new();
    if tags.len() < 2 {
        return Ok(CooccurrenceResult { cooccurrences });
    }

    for (i, tag1) in tags.iter().enumerate() {
        for tag2 in &tags[i + 1..] {
            let filters = SearchFilters {
                tags: vec![tag1.clone(), tag2.clone()],
                tag_mode: Some(TagMode::And),
                ..Default::default()
            };
            let cleaned = execute(runner, &build_search_command(&filters, journal)).await?;
            match parse_export(&cleaned) {
                Ok(found) if !found.entries.is_empty() => cooccurrences.push(TagCooccurrence {
                    tag1: tag1.clone(),
                    tag2: tag2.clone(),
                    count: found.entries.len() as u64,
                }),
                Ok(_) => {}
                Err(e) => debug!("Skipping pair {} + {}: {}", tag1, tag2, e),
            }
        }
    }

    cooccurrences.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(CooccurrenceResult { cooccurrences })
}
