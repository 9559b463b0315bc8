use tracing::{info, warn};

use crate::command::build_list_journals_command;
use crate::error::Result;
use crate::executor::{Runner, execute};
use crate::listing::parse_journal_listing;
use crate::session::Session;
use crate::types::{JournalsResult, SetJournalResult};

/// Enumerate journals. The first default found becomes the current journal
/// if the session has none yet.
pub async fn list_journals<R: Runner>(runner: &R, session: &Session) -> Result<JournalsResult> {
    let cleaned = execute(runner, &build_list_journals_command()).await?;
    let listing = parse_journal_listing(&cleaned);
    for line in &listing.unmatched {
        warn!("Unrecognized journal listing line: {:?}", line);
    }

    if let Some(default) = listing.items.iter().find(|j| j.is_default)
        && session.adopt_default_if_unset(&default.name).await
    {
        info!("Current journal set to default '{}'", default.name);
    }

    Ok(JournalsResult {
        journals: listing.items,
        current_journal: session.current_journal().await,
    })
}

pub async fn set_journal(session: &Session, journal_name: &str) -> Result<SetJournalResult> {
    let current_journal = session.set_journal(journal_name).await?;
    info!("Current journal set to '{}'", current_journal);
    Ok(SetJournalResult {
        success: true,
        current_journal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FixtureRunner;
    use crate::handlers::test_support::Scripted;

    #[tokio::test]
    async fn default_journal_is_adopted_when_unset() {
        let session = Session::new();
        let result = list_journals(&FixtureRunner::default(), &session)
            .await
            .unwrap();
        assert_eq!(result.journals.len(), 3);
        assert_eq!(result.current_journal.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn explicit_selection_survives_listing() {
        let session = Session::new();
        set_journal(&session, "work").await.unwrap();
        let result = list_journals(&FixtureRunner::default(), &session)
            .await
            .unwrap();
        assert_eq!(result.current_journal.as_deref(), Some("work"));
    }

    #[tokio::test]
    async fn listing_without_default_leaves_selection_empty() {
        let session = Session::new();
        let runner = Scripted::stdout("work -> /a.txt\npersonal -> /b.txt\n");
        let result = list_journals(&runner, &session).await.unwrap();
        assert_eq!(result.journals.len(), 2);
        assert_eq!(result.current_journal, None);
    }

    #[tokio::test]
    async fn set_journal_echoes_name() {
        let session = Session::new();
        let result = set_journal(&session, "personal").await.unwrap();
        assert!(result.success);
        assert_eq!(result.current_journal, "personal");
        assert_eq!(session.current_journal().await.as_deref(), Some("personal"));
    }
}
