//! Dispatcher flows across operations, on the fixture journal and on a
//! recording runner that answers like jrnl would.

use std::future::Future;
use std::sync::{Arc, Mutex};

use jrnl_core::executor::{RunOutput, Runner};
use jrnl_core::{Dispatcher, FixtureRunner, Operation};
use serde_json::{Value, json};

/// Answers every call with the same stdout and remembers the arguments.
#[derive(Clone)]
struct Recording {
    stdout: String,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Recording {
    fn new(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Runner for Recording {
    fn run(&self, args: &[String]) -> impl Future<Output = RunOutput> + Send {
        self.calls.lock().unwrap().push(args.to_vec());
        let output = RunOutput::ok(self.stdout.clone());
        async move { output }
    }
}

async fn call(dispatcher: &Dispatcher<impl Runner>, name: &str, args: Value) -> Value {
    let text = dispatcher.dispatch(name, args).await;
    serde_json::from_str(&text).unwrap_or_else(|_| panic!("{name} returned non-JSON: {text}"))
}

mod journal_selection {
    use super::*;

    #[tokio::test]
    async fn set_journal_applies_to_calls_without_journal() {
        let runner = Recording::new("@work : 5\n");
        let dispatcher = Dispatcher::new(runner.clone());

        call(&dispatcher, "set_journal", json!({"journalName": "work"})).await;
        // Only the argument lists matter here, not whether the output parses.
        dispatcher.dispatch("list_tags", json!({})).await;
        dispatcher.dispatch("search_entries", json!({"limit": 2})).await;
        dispatcher.dispatch("get_statistics", json!({})).await;

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|args| args[0] == "work"), "{calls:?}");
    }

    #[tokio::test]
    async fn explicit_journal_overrides_selection() {
        let runner = Recording::new("@work : 5\n");
        let dispatcher = Dispatcher::new(runner.clone());

        call(&dispatcher, "set_journal", json!({"journalName": "work"})).await;
        call(&dispatcher, "list_tags", json!({"journal": "personal"})).await;

        assert_eq!(runner.calls()[0], vec!["personal", "--tags"]);
    }

    #[tokio::test]
    async fn no_selection_means_no_journal_token() {
        let runner = Recording::new("@work : 5\n");
        let dispatcher = Dispatcher::new(runner.clone());
        call(&dispatcher, "list_tags", json!({})).await;
        assert_eq!(runner.calls()[0], vec!["--tags"]);
    }

    #[tokio::test]
    async fn listing_adopts_default_then_set_journal_replaces_it() {
        let dispatcher = Dispatcher::new(FixtureRunner::default());

        let listed = call(&dispatcher, Operation::ListJournals.name(), Value::Null).await;
        assert_eq!(listed["currentJournal"], "default");

        call(&dispatcher, "set_journal", json!({"journalName": "personal"})).await;
        let listed = call(&dispatcher, "list_journals", json!({})).await;
        assert_eq!(listed["currentJournal"], "personal");
    }
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn tag_listing_reports_counts() {
        let dispatcher = Dispatcher::new(Recording::new("@work : 5\n@personal : 2\n"));
        let response = call(&dispatcher, "list_tags", json!({})).await;
        assert_eq!(response["tags"]["@work"], 5);
        assert_eq!(response["tags"]["@personal"], 2);
    }

    #[tokio::test]
    async fn work_search_on_fixture() {
        let dispatcher = Dispatcher::new(FixtureRunner::default());
        let response = call(&dispatcher, "search_entries", json!({"tags": ["work"]})).await;
        let entries = response["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(
            entries
                .iter()
                .all(|e| e["tags"].as_array().unwrap().contains(&json!("@work")))
        );
    }

    #[tokio::test]
    async fn and_mode_search() {
        let dispatcher = Dispatcher::new(FixtureRunner::default());
        let response = call(
            &dispatcher,
            "search_entries",
            json!({"tags": ["work", "idea"], "tagMode": "and"}),
        )
        .await;
        let entries = response["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["title"], "Feature idea");
    }

    #[tokio::test]
    async fn yearly_statistics_bucket() {
        let dispatcher = Dispatcher::new(FixtureRunner::default());
        let response = call(
            &dispatcher,
            "get_statistics",
            json!({"timeGrouping": "year", "includeTopTags": false}),
        )
        .await;
        let stats = &response["statistics"];
        let words = stats["totalWords"].clone();
        assert_eq!(
            stats["timeGrouping"],
            json!([{"period": "2024", "entryCount": 7, "wordCount": words}])
        );
        assert!(stats.get("topTags").is_none());
    }

    #[tokio::test]
    async fn empty_output_gives_zero_statistics() {
        let dispatcher = Dispatcher::new(Recording::new("no entries found\n"));
        let response = call(&dispatcher, "get_statistics", json!({})).await;
        let stats = &response["statistics"];
        assert_eq!(stats["totalEntries"], 0);
        assert_eq!(stats["totalWords"], 0);
        assert_eq!(stats["averageWordsPerEntry"], 0);
    }

    #[tokio::test]
    async fn cooccurrence_with_one_tag_runs_nothing() {
        let runner = Recording::new("no entries found");
        let dispatcher = Dispatcher::new(runner.clone());
        let response = call(
            &dispatcher,
            "analyze_tag_cooccurrence",
            json!({"tags": ["work"]}),
        )
        .await;
        assert_eq!(response, json!({"cooccurrences": []}));
        assert!(runner.calls().is_empty());
    }
}

mod error_rendering {
    use super::*;

    #[tokio::test]
    async fn failures_render_code_and_message() {
        struct Failing;
        impl Runner for Failing {
            fn run(&self, _args: &[String]) -> impl Future<Output = RunOutput> + Send {
                let output = RunOutput {
                    stdout: String::new(),
                    stderr: "Error: journal file is locked\n".into(),
                    success: false,
                    exit_code: Some(1),
                };
                async move { output }
            }
        }

        let dispatcher = Dispatcher::new(Failing);
        let text = dispatcher.dispatch("list_tags", json!({})).await;
        assert_eq!(
            text,
            "Error: JRNL_EXECUTION_ERROR: jrnl command failed: Error: journal file is locked"
        );
    }

    #[tokio::test]
    async fn prose_instead_of_json_is_an_execution_error() {
        let dispatcher = Dispatcher::new(Recording::new("Journal 'work' is encrypted"));
        let text = dispatcher.dispatch("search_entries", json!({})).await;
        assert!(
            text.starts_with("Error: JRNL_EXECUTION_ERROR: Failed to parse jrnl output as JSON"),
            "{text}"
        );
    }
}
