//! Request dispatcher: operation names to handlers, results to response text.
//!
//! Argument handling is forgiving: a field of the wrong JSON
//! type is treated as absent, and a non-array `tags` becomes an empty list.
//! Every failure is rendered as `Error: CODE: message`; nothing escapes to
//! the transport.

use std::fmt;
use std::future::Future;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::error;

use crate::command::{SearchFilters, TagMode};
use crate::error::{JrnlError, Result};
use crate::executor::Runner;
use crate::handlers;
use crate::session::Session;
use crate::statistics::TimeGrouping;
use crate::types::{
    CooccurrenceResult, JournalsResult, SearchResult, SetJournalResult, StatisticsResult,
    TagsResult,
};

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SearchEntries,
    ListTags,
    AnalyzeTagCooccurrence,
    GetStatistics,
    ListJournals,
    SetJournal,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::SearchEntries,
        Operation::ListTags,
        Operation::AnalyzeTagCooccurrence,
        Operation::GetStatistics,
        Operation::ListJournals,
        Operation::SetJournal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::SearchEntries => "search_entries",
            Operation::ListTags => "list_tags",
            Operation::AnalyzeTagCooccurrence => "analyze_tag_cooccurrence",
            Operation::GetStatistics => "get_statistics",
            Operation::ListJournals => "list_journals",
            Operation::SetJournal => "set_journal",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| JrnlError::UnknownOperation(name.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Any value that does not fit `T` is treated as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Arrays keep their string items; anything else is an empty list.
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntriesParams {
    /// Start date (e.g. "yesterday", "2024-01-01")
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    /// End date
    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<String>,
    /// Tags to filter by
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// "or" (any tag, default) or "and" (every tag)
    #[serde(default, deserialize_with = "lenient")]
    pub tag_mode: Option<TagMode>,
    /// Text to search for
    #[serde(default, deserialize_with = "lenient")]
    pub contains: Option<String>,
    /// Maximum number of entries (0 means no limit)
    #[serde(default, deserialize_with = "lenient")]
    pub limit: Option<u64>,
    /// Only show starred entries
    #[serde(default, deserialize_with = "lenient")]
    pub starred: Option<bool>,
    /// Journal name (uses current/default if not specified)
    #[serde(default, deserialize_with = "lenient")]
    pub journal: Option<String>,
}

impl SearchEntriesParams {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            from: self.from.clone(),
            to: self.to.clone(),
            tags: self.tags.clone(),
            tag_mode: self.tag_mode,
            contains: self.contains.clone(),
            limit: self.limit,
            starred: self.starred.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListTagsParams {
    /// Journal name (uses current/default if not specified)
    #[serde(default, deserialize_with = "lenient")]
    pub journal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CooccurrenceParams {
    /// Tags to analyze for co-occurrence (at least two)
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// Journal name (uses current/default if not specified)
    #[serde(default, deserialize_with = "lenient")]
    pub journal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsParams {
    /// Journal name (uses current/default if not specified)
    #[serde(default, deserialize_with = "lenient")]
    pub journal: Option<String>,
    /// Group statistics by time period: day, week, month or year
    #[serde(default, deserialize_with = "lenient")]
    pub time_grouping: Option<String>,
    /// Include top tags in statistics (default: true)
    #[serde(default, deserialize_with = "lenient")]
    pub include_top_tags: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListJournalsParams {}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetJournalParams {
    /// Name of the journal to set as active
    #[serde(default, deserialize_with = "lenient")]
    pub journal_name: Option<String>,
}

fn parse_params<T: DeserializeOwned + Default>(operation: Operation, args: Value) -> Result<T> {
    match args {
        Value::Object(_) => serde_json::from_value(args).map_err(|e| JrnlError::InvalidArgument {
            message: format!("Invalid arguments for {operation}: {e}"),
            argument: None,
        }),
        _ => Ok(T::default()),
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Owns the backend and the session's current-journal selection.
#[derive(Debug, Clone)]
pub struct Dispatcher<R> {
    runner: R,
    session: Session,
}

impl<R: Runner> Dispatcher<R> {
    pub fn new(runner: R) -> Self {
        Self::with_session(runner, Session::new())
    }

    pub fn with_session(runner: R, session: Session) -> Self {
        Self { runner, session }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn search_entries(&self, params: SearchEntriesParams) -> Result<SearchResult> {
        let journal = self.session.resolve(params.journal.as_deref()).await;
        handlers::search_entries(&self.runner, &params.filters(), journal.as_deref()).await
    }

    pub async fn list_tags(&self, params: ListTagsParams) -> Result<TagsResult> {
        let journal = self.session.resolve(params.journal.as_deref()).await;
        handlers::list_tags(&self.runner, journal.as_deref()).await
    }

    pub async fn analyze_tag_cooccurrence(
        &self,
        params: CooccurrenceParams,
    ) -> Result<CooccurrenceResult> {
        let journal = self.session.resolve(params.journal.as_deref()).await;
        handlers::analyze_tag_cooccurrence(&self.runner, &params.tags, journal.as_deref()).await
    }

    pub async fn get_statistics(&self, params: StatisticsParams) -> Result<StatisticsResult> {
        let journal = self.session.resolve(params.journal.as_deref()).await;
        let grouping = params.time_grouping.as_deref().map(TimeGrouping::from_key);
        handlers::get_statistics(
            &self.runner,
            journal.as_deref(),
            grouping,
            params.include_top_tags.unwrap_or(true),
        )
        .await
    }

    pub async fn list_journals(&self, _params: ListJournalsParams) -> Result<JournalsResult> {
        handlers::list_journals(&self.runner, &self.session).await
    }

    pub async fn set_journal(&self, params: SetJournalParams) -> Result<SetJournalResult> {
        let name = params.journal_name.unwrap_or_default();
        handlers::set_journal(&self.session, &name).await
    }

    /// Run `operation` with loosely typed arguments and render the response.
    pub async fn call(&self, operation: Operation, args: Value) -> String {
        match operation {
            Operation::SearchEntries => self.run(operation, args, |p| self.search_entries(p)).await,
            Operation::ListTags => self.run(operation, args, |p| self.list_tags(p)).await,
            Operation::AnalyzeTagCooccurrence => {
                self.run(operation, args, |p| self.analyze_tag_cooccurrence(p))
                    .await
            }
            Operation::GetStatistics => self.run(operation, args, |p| self.get_statistics(p)).await,
            Operation::ListJournals => self.run(operation, args, |p| self.list_journals(p)).await,
            Operation::SetJournal => self.run(operation, args, |p| self.set_journal(p)).await,
        }
    }

    /// Parse the arguments into `P`, run the handler and render its result.
    async fn run<P, T, F, Fut>(&self, operation: Operation, args: Value, handler: F) -> String
    where
        P: DeserializeOwned + Default,
        T: Serialize,
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = match parse_params::<P>(operation, args) {
            Ok(params) => handler(params).await,
            Err(e) => Err(e),
        };
        render(operation.name(), result)
    }

    /// Entry point by operation name. Unknown names render `UNKNOWN_OPERATION`.
    pub async fn dispatch(&self, name: &str, args: Value) -> String {
        match Operation::from_name(name) {
            Ok(operation) => self.call(operation, args).await,
            Err(e) => render::<Value>(name, Err(e)),
        }
    }
}

/// Pretty JSON on success, `Error: CODE: message` on failure.
pub fn render<T: Serialize>(operation: &str, result: Result<T>) -> String {
    let result = result.and_then(|value| Ok(serde_json::to_string_pretty(&value)?));
    match result {
        Ok(text) => text,
        Err(e) => {
            error!("tool:{} failed: {} ({})", operation, e, e.code());
            format!("Error: {}: {}", e.code(), e)
        }
    }
}
