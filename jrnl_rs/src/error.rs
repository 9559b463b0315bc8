//! Error taxonomy for the jrnl bridge.
//!
//! One tagged enum covers every failure the handlers can surface. The
//! dispatcher matches on it exhaustively (through [`JrnlError::code`]) when it
//! renders the `CODE: message` text returned to clients.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, JrnlError>;

/// Default message when the jrnl executable cannot be spawned.
pub const NOT_FOUND_MESSAGE: &str = "jrnl command not found";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JrnlError {
    /// The jrnl executable is missing or not on `PATH`.
    #[error("{message}")]
    NotFound { message: String },

    /// Nonzero exit, timeout, oversized output or unparseable output.
    #[error("{message}")]
    Execution {
        message: String,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    /// Malformed caller input.
    #[error("{message}")]
    InvalidArgument {
        message: String,
        argument: Option<String>,
    },

    #[error("{0}")]
    Configuration(String),

    #[error("Journal '{0}' not found")]
    JournalNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownOperation(String),
}

impl JrnlError {
    pub fn not_found() -> Self {
        Self::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            exit_code: None,
            stderr: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            argument: Some(argument.into()),
        }
    }

    /// Stable machine-readable code, prefixed to rendered error text.
    pub fn code(&self) -> &'static str {
        match self {
            JrnlError::NotFound { .. } => "JRNL_NOT_FOUND",
            JrnlError::Execution { .. } => "JRNL_EXECUTION_ERROR",
            JrnlError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            JrnlError::Configuration(_) => "CONFIGURATION_ERROR",
            JrnlError::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            JrnlError::UnknownOperation(_) => "UNKNOWN_OPERATION",
        }
    }
}

impl From<serde_json::Error> for JrnlError {
    fn from(err: serde_json::Error) -> Self {
        JrnlError::execution(format!("Failed to parse jrnl output as JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_default_message() {
        let err = JrnlError::not_found();
        assert_eq!(err.to_string(), "jrnl command not found");
        assert_eq!(err.code(), "JRNL_NOT_FOUND");
    }

    #[test]
    fn execution_keeps_exit_code_and_stderr() {
        let err = JrnlError::Execution {
            message: "Command failed".into(),
            exit_code: Some(1),
            stderr: Some("Error output".into()),
        };
        assert_eq!(err.to_string(), "Command failed");
        assert_eq!(err.code(), "JRNL_EXECUTION_ERROR");
        match err {
            JrnlError::Execution {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(stderr.as_deref(), Some("Error output"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn journal_not_found_names_the_journal() {
        let err = JrnlError::JournalNotFound("work".into());
        assert_eq!(err.to_string(), "Journal 'work' not found");
        assert_eq!(err.code(), "JOURNAL_NOT_FOUND");
    }

    #[test]
    fn invalid_argument_records_argument_name() {
        let err = JrnlError::invalid_argument("Invalid date format", "from");
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert!(matches!(
            err,
            JrnlError::InvalidArgument { argument: Some(ref a), .. } if a == "from"
        ));
    }

    #[test]
    fn json_errors_become_execution_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: JrnlError = parse_err.into();
        assert_eq!(err.code(), "JRNL_EXECUTION_ERROR");
        assert!(err.to_string().starts_with("Failed to parse jrnl output as JSON"));
    }
}
