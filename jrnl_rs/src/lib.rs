//! # jrnl-core
//!
//! Typed access to the [jrnl](https://jrnl.sh) command-line journal.
//!
//! jrnl prints a mix of JSON exports, plain-text listings and box-drawn
//! decoration depending on the subcommand. This crate builds the argument
//! lists, runs the binary (or an in-process fixture), cleans up what comes
//! back and turns it into typed results, with journal analytics (word
//! counts, time buckets, tag ranking, tag co-occurrence) computed in-process.
//!
//! ## Layers
//!
//! - [`command`]: pure argument builders
//! - [`executor`]: process and fixture backends behind the [`Runner`] trait
//! - [`normalize`] and [`listing`]: output cleanup and text parsers
//! - [`handlers`]: one function per capability
//! - [`dispatch`]: operation names, lenient parameters, response rendering
//!
//! ```no_run
//! use jrnl_core::{Dispatcher, Executor, JrnlConfig};
//!
//! # async fn demo() {
//! let dispatcher = Dispatcher::new(Executor::from_config(&JrnlConfig::default()));
//! let text = dispatcher
//!     .dispatch("list_tags", serde_json::json!({}))
//!     .await;
//! println!("{text}");
//! # }
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod handlers;
pub mod listing;
pub mod normalize;
mod regexes;
pub mod session;
pub mod statistics;
pub mod types;

pub use command::{SearchFilters, TagMode, normalize_tag};
pub use config::{CliOptions, FileConfig, JrnlConfig, load_config, resolve_config};
pub use dispatch::{
    CooccurrenceParams, Dispatcher, ListJournalsParams, ListTagsParams, Operation,
    SearchEntriesParams, SetJournalParams, StatisticsParams, render,
};
pub use error::{JrnlError, Result};
pub use executor::{Executor, FixtureRunner, ProcessRunner, RunOutput, Runner, probe_version};
pub use session::Session;
pub use statistics::TimeGrouping;
pub use types::*;
