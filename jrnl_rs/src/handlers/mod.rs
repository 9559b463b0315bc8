//! One handler per capability.
//!
//! Each composes the command builder, a [`Runner`](crate::executor::Runner)
//! and the normalizer, then does any aggregation in-process. Handlers return
//! typed results; rendering them for clients is the dispatcher's job.

mod entries;
mod journals;
mod statistics;
mod tags;

pub use entries::search_entries;
pub use journals::{list_journals, set_journal};
pub use statistics::get_statistics;
pub use tags::{analyze_tag_cooccurrence, list_tags};

use crate::error::Result;
use crate::types::ExportPayload;

/// Parse normalized `--export json` text. Parse failures become `Execution` errors.
pub(crate) fn parse_export(cleaned: &str) -> Result<ExportPayload> {
    Ok(serde_json::from_str(cleaned)?)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_parse_failure_is_execution_error() {
        let err = parse_export("@work : 5").unwrap_err();
        assert_eq!(err.code(), "JRNL_EXECUTION_ERROR");
    }

    #[test]
    fn export_tolerates_missing_sections() {
        let payload = parse_export("{}").unwrap();
        assert!(payload.entries.is_empty());
        assert!(payload.tags.is_empty());
    }
}
