//! Running jrnl and classifying what came back.
//!
//! A [`Runner`] produces raw stdout/stderr plus a success flag and never
//! fails by itself: spawn errors and timeouts are folded into the captured
//! stderr. [`execute`] then turns that into a typed result and normalizes
//! stdout.

mod fixture;
mod process;

use std::future::Future;

use tracing::debug;

pub use fixture::{FixtureJournal, FixtureRunner, fixture_entries, fixture_journals};
pub use process::ProcessRunner;

use crate::command::build_version_command;
use crate::config::JrnlConfig;
use crate::error::{JrnlError, Result};
use crate::normalize::normalize_output;

/// stderr fragments that mean the executable itself is missing.
pub const NOT_FOUND_SIGNATURES: &[&str] = &["ENOENT", "command not found", "os error 2"];

/// Captured result of one jrnl invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl RunOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
            exit_code: Some(0),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            exit_code: None,
        }
    }
}

/// Something that can run jrnl with an argument list.
pub trait Runner: Send + Sync {
    fn run(&self, args: &[String]) -> impl Future<Output = RunOutput> + Send;
}

/// Backend chosen from configuration.
#[derive(Debug, Clone)]
pub enum Executor {
    Process(ProcessRunner),
    Fixture(FixtureRunner),
}

impl Executor {
    pub fn from_config(config: &JrnlConfig) -> Self {
        if config.use_fixture {
            Executor::Fixture(FixtureRunner::default())
        } else {
            Executor::Process(ProcessRunner::new(config))
        }
    }

    pub fn is_fixture(&self) -> bool {
        matches!(self, Executor::Fixture(_))
    }
}

impl Runner for Executor {
    fn run(&self, args: &[String]) -> impl Future<Output = RunOutput> + Send {
        async move {
            match self {
                Executor::Process(runner) => runner.run(args).await,
                Executor::Fixture(runner) => runner.run(args).await,
            }
        }
    }
}

/// Map a failed run to `NotFound` or `Execution`; pass stdout through on success.
pub fn classify(output: RunOutput) -> Result<String> {
    if output.success {
        return Ok(output.stdout);
    }
    if NOT_FOUND_SIGNATURES
        .iter()
        .any(|sig| output.stderr.contains(sig))
    {
        return Err(JrnlError::not_found());
    }
    Err(JrnlError::Execution {
        message: format!("jrnl command failed: {}", output.stderr.trim()),
        exit_code: output.exit_code,
        stderr: Some(output.stderr),
    })
}

/// Run, classify and normalize.
pub async fn execute<R: Runner>(runner: &R, args: &[String]) -> Result<String> {
    debug!("Executing jrnl with args: {}", args.join(" "));
    let stdout = classify(runner.run(args).await)?;
    let cleaned = normalize_output(&stdout);
    debug!("jrnl output cleaned, length: {}", cleaned.len());
    Ok(cleaned)
}

/// `jrnl --version`, trimmed. Used as a startup probe.
pub async fn probe_version<R: Runner>(runner: &R) -> Result<String> {
    let output = runner.run(&build_version_command()).await;
    classify(output).map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(RunOutput);

    impl Runner for Canned {
        fn run(&self, _args: &[String]) -> impl Future<Output = RunOutput> + Send {
            let out = self.0.clone();
            async move { out }
        }
    }

    #[test]
    fn missing_binary_is_classified_as_not_found() {
        let err = classify(RunOutput::failed(
            "\njrnl: command not found (No such file or directory (os error 2))",
        ))
        .unwrap_err();
        assert_eq!(err, JrnlError::not_found());
    }

    #[test]
    fn nonzero_exit_keeps_code_and_stderr() {
        let output = RunOutput {
            stdout: String::new(),
            stderr: "Error: journal is locked\n".into(),
            success: false,
            exit_code: Some(1),
        };
        match classify(output).unwrap_err() {
            JrnlError::Execution {
                message,
                exit_code,
                stderr,
            } => {
                assert_eq!(message, "jrnl command failed: Error: journal is locked");
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr.as_deref(), Some("Error: journal is locked\n"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn execute_normalizes_successful_output() {
        let runner = Canned(RunOutput::ok("2 entries found\n{\"tags\": {}, \"entries\": []}\n"));
        let out = execute(&runner, &["--export".to_string(), "json".to_string()])
            .await
            .unwrap();
        assert_eq!(out, r#"{"tags": {}, "entries": []}"#);
    }

    #[tokio::test]
    async fn probe_reports_version_text() {
        let runner = Canned(RunOutput::ok("jrnl v4.2\n"));
        assert_eq!(probe_version(&runner).await.unwrap(), "jrnl v4.2");
    }

    #[test]
    fn executor_follows_fixture_toggle() {
        assert!(Executor::from_config(&JrnlConfig::for_fixture()).is_fixture());
        assert!(!Executor::from_config(&JrnlConfig::default()).is_fixture());
    }
}
