//! Configuration types and loading for the jrnl bridge.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! environment toggles, then CLI flags.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JrnlError, Result};

pub const DEFAULT_BINARY: &str = "jrnl";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 5 * 1024 * 1024;

/// Select the in-process fixture backend instead of spawning jrnl.
pub const ENV_USE_MOCK: &str = "JRNL_MCP_USE_MOCK";
pub const ENV_DEBUG: &str = "JRNL_MCP_DEBUG";
pub const ENV_DEBUG_FALLBACK: &str = "DEBUG";
pub const ENV_BINARY: &str = "JRNL_MCP_BIN";
pub const ENV_TIMEOUT_MS: &str = "JRNL_MCP_TIMEOUT_MS";

/// Resolved runtime parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JrnlConfig {
    /// Executable name or path.
    pub binary: String,
    /// Per-invocation timeout.
    pub timeout: Duration,
    /// Cap on captured stdout.
    pub max_output_bytes: usize,
    pub use_fixture: bool,
    /// Verbose diagnostics on stderr.
    pub debug: bool,
    /// Always pass `--journal <name>` when set.
    pub journal_override: Option<String>,
}

impl Default for JrnlConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            use_fixture: false,
            debug: false,
            journal_override: None,
        }
    }
}

impl JrnlConfig {
    /// Fixture-backed configuration, used by tests and CI.
    pub fn for_fixture() -> Self {
        Self {
            use_fixture: true,
            ..Self::default()
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(self) -> Result<Self> {
        if self.timeout.is_zero() {
            return Err(JrnlError::Configuration(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.binary.trim().is_empty() {
            return Err(JrnlError::Configuration("jrnl binary path is empty".into()));
        }
        Ok(self)
    }
}

/// On-disk TOML configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileConfig {
    pub binary: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_output_bytes: Option<usize>,
    pub use_fixture: Option<bool>,
    pub debug: Option<bool>,
    pub journal_override: Option<String>,
}

/// CLI options that can override file and environment settings.
///
/// Keeps the library free of clap types; the binary implements it.
pub trait CliOptions {
    fn binary(&self) -> Option<String>;
    fn timeout_ms(&self) -> Option<u64>;
    fn fixture(&self) -> bool;
    fn journal_override(&self) -> Option<String>;
    fn debug(&self) -> bool;
}

pub fn load_config(path: &Path) -> Result<FileConfig> {
    let data = fs::read_to_string(path).map_err(|e| {
        JrnlError::Configuration(format!("failed to read config {}: {e}", path.display()))
    })?;
    toml::from_str(&data).map_err(|e| {
        JrnlError::Configuration(format!("failed to parse toml config {}: {e}", path.display()))
    })
}

fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("true") || v == "1"
}

/// Merge defaults, file, environment and CLI (in that order of precedence).
///
/// `env` is a lookup so tests can supply variables without touching the
/// process environment.
pub fn resolve_config<C, F>(cli: &C, file: Option<&FileConfig>, env: F) -> Result<JrnlConfig>
where
    C: CliOptions,
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = JrnlConfig::default();

    if let Some(file) = file {
        if let Some(binary) = &file.binary {
            cfg.binary = binary.clone();
        }
        if let Some(ms) = file.timeout_ms {
            cfg.timeout = Duration::from_millis(ms);
        }
        if let Some(bytes) = file.max_output_bytes {
            cfg.max_output_bytes = bytes;
        }
        cfg.use_fixture = file.use_fixture.unwrap_or(cfg.use_fixture);
        cfg.debug = file.debug.unwrap_or(cfg.debug);
        if file.journal_override.is_some() {
            cfg.journal_override = file.journal_override.clone();
        }
    }

    if env(ENV_USE_MOCK).is_some_and(|v| is_truthy(&v)) {
        cfg.use_fixture = true;
    }
    if env(ENV_DEBUG).is_some_and(|v| is_truthy(&v))
        || env(ENV_DEBUG_FALLBACK).is_some_and(|v| is_truthy(&v))
    {
        cfg.debug = true;
    }
    if let Some(binary) = env(ENV_BINARY).filter(|b| !b.trim().is_empty()) {
        cfg.binary = binary;
    }
    if let Some(raw) = env(ENV_TIMEOUT_MS) {
        let ms = raw.trim().parse::<u64>().map_err(|_| {
            JrnlError::Configuration(format!("{ENV_TIMEOUT_MS} must be an integer, got '{raw}'"))
        })?;
        cfg.timeout = Duration::from_millis(ms);
    }

    if let Some(binary) = cli.binary() {
        cfg.binary = binary;
    }
    if let Some(ms) = cli.timeout_ms() {
        cfg.timeout = Duration::from_millis(ms);
    }
    if cli.fixture() {
        cfg.use_fixture = true;
    }
    if cli.debug() {
        cfg.debug = true;
    }
    if let Some(journal) = cli.journal_override() {
        cfg.journal_override = Some(journal);
    }

    cfg.validate()
}
