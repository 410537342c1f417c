//! Storage abstraction for the drill log.
//!
//! Trait-based abstraction for persisting drills and safety responses.
//! The trait is synchronous (no async) to keep the orchestrator's API
//! synchronous; implementations share internal state via `Arc` so
//! clones access the same underlying storage.
//!
//! Both stores enforce the two documented response policies:
//!
//! - Referential integrity: a response must reference an existing
//!   drill ([`StorageError::UnknownDrill`] otherwise).
//! - Deduplication: one response per `(drill_id, student_id)`; a
//!   repeat submission returns the existing row with
//!   `newly_recorded == false`.

mod error;
mod memory;
mod redb;

use drillcast_proto::{Drill, DrillReport, SafeResponse};
pub use error::StorageError;
pub use memory::MemoryStorage;

pub use self::redb::RedbStorage;

/// Outcome of [`DrillStore::record_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResponse {
    /// The stored response: freshly inserted, or the pre-existing row
    /// when the same student already acknowledged this drill.
    pub response: SafeResponse,
    /// `true` when the row was inserted by this call. Only a newly
    /// recorded response triggers a teacher-room broadcast.
    pub newly_recorded: bool,
}

/// Append-only persistence for drills and responses, plus the read
/// queries reports are built from.
pub trait DrillStore: Clone + Send + Sync + 'static {
    /// Append a drill, assigning the next monotonic id.
    ///
    /// `started_at_ms` comes from the server environment, never from
    /// clients. A drill that fails to persist must surface the error:
    /// an alert that appears sent without an audit row would corrupt
    /// report history.
    fn create_drill(
        &self,
        kind: &str,
        class: &str,
        message: &str,
        started_by: &str,
        started_at_ms: u64,
    ) -> Result<Drill, StorageError>;

    /// Record a student's safety acknowledgement.
    ///
    /// Fails with [`StorageError::UnknownDrill`] when `drill_id` does
    /// not reference a stored drill. Idempotent per
    /// `(drill_id, student_id)`.
    fn record_response(
        &self,
        drill_id: u64,
        student_id: u64,
        time_ms: u64,
    ) -> Result<RecordedResponse, StorageError>;

    /// Full report history: one row per drill with its distinct
    /// responder count, ordered by `started_at_ms` descending, ties
    /// broken by id descending.
    fn list_reports(&self) -> Result<Vec<DrillReport>, StorageError>;

    /// Responses recorded for one drill, in insertion order.
    fn responses_for(&self, drill_id: u64) -> Result<Vec<SafeResponse>, StorageError>;

    /// Most recent drill visible to `class`: targeting that class or
    /// the `ALL` sentinel. Recency follows the report ordering.
    fn latest_for_class(&self, class: &str) -> Result<Option<Drill>, StorageError>;
}

/// Report-history ordering: `started_at_ms` descending, id descending
/// on ties. Shared by both store implementations.
fn report_order(a: &Drill, b: &Drill) -> std::cmp::Ordering {
    (b.started_at_ms, b.id).cmp(&(a.started_at_ms, a.id))
}

/// Whether a drill targeting `drill_class` is visible to `class`.
fn visible_to_class(drill_class: &str, class: &str) -> bool {
    drill_class == class || drill_class == drillcast_proto::ALL_CLASSES
}
