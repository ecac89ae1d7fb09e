//! Seams between the sync engine and the outside world.
//!
//! A [`RecordSource`] lists the authoritative records of one kind; a
//! [`DocumentSink`] accepts one search document at a time. The engine in
//! [`crate::sync`] only talks to these traits, so sources (HTTP listings,
//! document-store exports, in-memory sets) and sinks (the search API, test
//! doubles) can be combined freely.
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌────────────────┐
//! │ RecordSource │──▶│  transform  │──▶│  DocumentSink  │
//! │ HTTP/command │   │ per kind    │   │ POST /index    │
//! └──────────────┘   └─────────────┘   └────────────────┘
//! ```

use anyhow::Result;
use async_trait::async_trait;

use crate::index_client::SubmitError;
use crate::models::{RecordKind, SearchDocument, SourceRecord};

/// A system of record that can list its full current record set.
///
/// # Example
///
/// ```rust
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use gym_index_sync::models::{RecordKind, SourceRecord};
/// use gym_index_sync::traits::RecordSource;
///
/// struct NoActivities;
///
/// #[async_trait]
/// impl RecordSource for NoActivities {
///     fn name(&self) -> &str { "none" }
///     fn kind(&self) -> RecordKind { RecordKind::Activity }
///     fn endpoint(&self) -> String { "memory".to_string() }
///     async fn list(&self) -> Result<Vec<SourceRecord>> { Ok(vec![]) }
/// }
/// ```
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short name used in logs and summaries (e.g. `"activities"`).
    fn name(&self) -> &str;

    /// Kind of every record this source returns.
    fn kind(&self) -> RecordKind;

    /// Where the records come from (URL or command line), for display.
    fn endpoint(&self) -> String;

    /// Fetch the full current record set.
    ///
    /// Any error is fatal for the run.
    async fn list(&self) -> Result<Vec<SourceRecord>>;
}

/// Destination for search documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Submit one document. Errors are per-record: the engine counts them
    /// and moves on.
    async fn submit(&self, document: &SearchDocument) -> Result<(), SubmitError>;
}

/// Source over records already in memory (e.g. plans just created through
/// the API).
pub struct StaticSource {
    name: String,
    kind: RecordKind,
    records: Vec<SourceRecord>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, kind: RecordKind, records: Vec<SourceRecord>) -> Self {
        Self {
            name: name.into(),
            kind,
            records,
        }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn endpoint(&self) -> String {
        "memory".to_string()
    }

    async fn list(&self) -> Result<Vec<SourceRecord>> {
        Ok(self.records.clone())
    }
}
