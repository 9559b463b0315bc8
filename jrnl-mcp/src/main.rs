//! # jrnl-mcp
//!
//! MCP server for the jrnl command-line journal. Search entries, list tags,
//! analyze tag co-occurrence and compute statistics from any MCP client.
//!
//! ## Usage
//!
//! ```bash
//! # Stdio server (default subcommand)
//! jrnl-mcp
//!
//! # Without jrnl installed: built-in fixture journal
//! JRNL_MCP_USE_MOCK=true jrnl-mcp
//!
//! # One-shot call, prints the response
//! jrnl-mcp call search_entries '{"tags": ["work"], "limit": 5}'
//! ```

use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ServerInfo;
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use jrnl_core::{
    CliOptions, CooccurrenceParams, Dispatcher, Executor, JrnlConfig, ListJournalsParams,
    ListTagsParams, Operation, SearchEntriesParams, SetJournalParams, StatisticsParams,
    load_config, probe_version, render, resolve_config,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "jrnl-mcp")]
#[command(about = "MCP server for jrnl - search, tag and analyze journal entries")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// jrnl executable name or path
    #[arg(long, global = true)]
    jrnl_bin: Option<String>,

    /// Per-invocation timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Answer from the built-in fixture journal instead of running jrnl
    #[arg(long, global = true)]
    fixture: bool,

    /// Always pass `--journal <NAME>` to jrnl
    #[arg(long, global = true, value_name = "NAME")]
    journal_override: Option<String>,

    /// Verbose diagnostics on stderr (same as JRNL_MCP_DEBUG=true)
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,
    /// Run a single operation and print its response
    Call {
        /// Operation name, e.g. search_entries
        operation: String,
        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

impl CliOptions for Args {
    fn binary(&self) -> Option<String> {
        self.jrnl_bin.clone()
    }

    fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    fn fixture(&self) -> bool {
        self.fixture
    }

    fn journal_override(&self) -> Option<String> {
        self.journal_override.clone()
    }

    fn debug(&self) -> bool {
        self.debug
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Clone)]
struct JrnlServer {
    dispatcher: Dispatcher<Executor>,
    /// Tool router (generated by macro)
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl JrnlServer {
    fn new(dispatcher: Dispatcher<Executor>) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl JrnlServer {
    #[tool(
        name = "search_entries",
        description = "Search and filter journal entries by date range, tags, text, starred flag and limit. Dates accept anything jrnl understands (\"yesterday\", \"2024-01-01\")."
    )]
    async fn search_entries(&self, Parameters(params): Parameters<SearchEntriesParams>) -> String {
        render(
            Operation::SearchEntries.name(),
            self.dispatcher.search_entries(params).await,
        )
    }

    #[tool(name = "list_tags", description = "List all tags with their usage counts")]
    async fn list_tags(&self, Parameters(params): Parameters<ListTagsParams>) -> String {
        render(
            Operation::ListTags.name(),
            self.dispatcher.list_tags(params).await,
        )
    }

    #[tool(
        name = "analyze_tag_cooccurrence",
        description = "Analyze which tags frequently appear together. Counts entries carrying both tags for every pair of the given tags."
    )]
    async fn analyze_tag_cooccurrence(
        &self,
        Parameters(params): Parameters<CooccurrenceParams>,
    ) -> String {
        render(
            Operation::AnalyzeTagCooccurrence.name(),
            self.dispatcher.analyze_tag_cooccurrence(params).await,
        )
    }

    #[tool(
        name = "get_statistics",
        description = "Get journal statistics: entry and word totals, optional breakdown by day/week/month/year, top tags."
    )]
    async fn get_statistics(&self, Parameters(params): Parameters<StatisticsParams>) -> String {
        render(
            Operation::GetStatistics.name(),
            self.dispatcher.get_statistics(params).await,
        )
    }

    #[tool(name = "list_journals", description = "List all available journals")]
    async fn list_journals(&self) -> String {
        render(
            Operation::ListJournals.name(),
            self.dispatcher
                .list_journals(ListJournalsParams::default())
                .await,
        )
    }

    #[tool(
        name = "set_journal",
        description = "Set the active journal for subsequent operations"
    )]
    async fn set_journal(&self, Parameters(params): Parameters<SetJournalParams>) -> String {
        render(
            Operation::SetJournal.name(),
            self.dispatcher.set_journal(params).await,
        )
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for JrnlServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation {
                name: "jrnl-mcp".to_string(),
                title: Some("jrnl MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                description: None,
                website_url: Some("https://jrnl.sh".to_string()),
            },
            instructions: Some(
                "Read-only access to the user's jrnl journals.\n\n\
                 - search_entries(from, to, tags, tagMode, contains, limit, starred, journal)\n\
                 - list_tags(journal) - tag usage counts.\n\
                 - analyze_tag_cooccurrence(tags, journal) - pairwise tag overlap.\n\
                 - get_statistics(journal, timeGrouping, includeTopTags)\n\
                 - list_journals() / set_journal(journalName) - pick the journal used \
                 when a call omits 'journal'.\n\n\
                 Failures come back as text starting with 'Error: <CODE>:'."
                    .into(),
            ),
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Install custom panic hook that logs to stderr and exits cleanly.
/// Covers the "broken pipe" panic when the client disconnects.
fn install_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        if is_broken_pipe(&msg) {
            eprintln!("[jrnl-mcp] Client disconnected (broken pipe), shutting down");
        } else {
            let location = panic_info
                .location()
                .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
                .unwrap_or_default();
            eprintln!("[jrnl-mcp] Panic{}: {}", location, msg);
        }

        // Exit with code 1 (not 101 which indicates panic)
        std::process::exit(1);
    }));
}

fn is_broken_pipe(text: &str) -> bool {
    text.contains("Broken pipe") || text.contains("os error 32")
}

/// Ignore SIGPIPE so writes to a closed stdout fail with EPIPE instead of
/// killing the process.
#[cfg(unix)]
fn ignore_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

#[cfg(not(unix))]
fn ignore_sigpipe() {}

/// stderr only: stdout carries MCP JSON-RPC or the `call` response.
fn init_tracing(args: &Args, config: &JrnlConfig, quiet_default: &str) {
    let fallback = match &args.log_level {
        Some(level) => level.clone(),
        None if config.debug => "debug".to_string(),
        None => quiet_default.to_string(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.parse().unwrap_or_default()),
        )
        .init();
}

fn load_settings(args: &Args) -> Result<JrnlConfig> {
    let file = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let config = resolve_config(args, file.as_ref(), |key| std::env::var(key).ok())?;
    Ok(config)
}

async fn run_server(config: JrnlConfig) -> Result<()> {
    info!("Starting jrnl-mcp v{}", env!("CARGO_PKG_VERSION"));
    debug!("Resolved config: {:?}", config);

    let dispatcher = Dispatcher::new(Executor::from_config(&config));
    if dispatcher.runner().is_fixture() {
        info!("Using built-in fixture journal");
    }
    match probe_version(dispatcher.runner()).await {
        Ok(version) => info!("jrnl available: {}", version),
        Err(e) => warn!(
            "jrnl probe failed ({}): {}. Tools will report errors until '{}' is installed",
            e.code(),
            e,
            config.binary
        ),
    }
    if let Some(journal) = &config.journal_override {
        info!("Every jrnl call is pinned to journal '{}'", journal);
    }

    let server = JrnlServer::new(dispatcher);

    info!("Server ready. Listening on stdio...");

    server
        .serve(rmcp::transport::stdio())
        .await?
        .waiting()
        .await?;

    Ok(())
}

/// Returns whether the operation succeeded.
async fn run_call(config: JrnlConfig, operation: &str, raw_args: &str) -> Result<bool> {
    let args: serde_json::Value = serde_json::from_str(raw_args)
        .with_context(|| format!("call arguments must be a JSON object, got: {raw_args}"))?;
    let dispatcher = Dispatcher::new(Executor::from_config(&config));
    let response = dispatcher.dispatch(operation, args).await;
    println!("{response}");
    Ok(!response.starts_with("Error: "))
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_settings(&args)?;
    match &args.command {
        Some(Command::Call { operation, args: raw }) => {
            init_tracing(&args, &config, "warn");
            let ok = run_call(config, operation, raw).await?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Some(Command::Serve) | None => {
            init_tracing(&args, &config, "info");
            run_server(config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    ignore_sigpipe();
    install_panic_hook();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            let err_str = format!("{:?}", e);
            if is_broken_pipe(&err_str) {
                eprintln!("[jrnl-mcp] Client disconnected, shutting down");
                ExitCode::SUCCESS
            } else {
                eprintln!("[jrnl-mcp] Error: {:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}
