//! Current-journal selection for one client session.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{JrnlError, Result};

/// The journal used when a request names none.
///
/// Cloning shares the same selection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current_journal(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// Overwrite the selection. Existence is not checked against `--list`.
    pub async fn set_journal(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(JrnlError::invalid_argument(
                "journalName must not be empty",
                "journalName",
            ));
        }
        *self.current.write().await = Some(name.to_string());
        Ok(name.to_string())
    }

    /// Adopt `name` only when nothing is selected yet. Returns whether it was adopted.
    pub async fn adopt_default_if_unset(&self, name: &str) -> bool {
        let mut current = self.current.write().await;
        if current.is_some() {
            return false;
        }
        *current = Some(name.to_string());
        true
    }

    /// `explicit` when given and non-empty, otherwise the current selection.
    pub async fn resolve(&self, explicit: Option<&str>) -> Option<String> {
        match explicit.map(str::trim).filter(|j| !j.is_empty()) {
            Some(name) => Some(name.to_string()),
            None => self.current_journal().await,
        }
    }
}
