//! Storage error type.

use thiserror::Error;

/// Errors from a [`super::DrillStore`] backend.
///
/// Storage failures are terminal for the operation that hit them: the
/// caller surfaces the failure instead of retrying silently, because a
/// notification that appears sent without a durable drill row would
/// corrupt the audit history.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// A response referenced a drill id that does not exist.
    ///
    /// Raised before any insert; orphan responses cannot be created.
    #[error("unknown drill id {0}")]
    UnknownDrill(u64),

    /// Backend I/O failure (open, transaction, commit).
    ///
    /// May be transient (disk pressure) or permanent (corrupt file).
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A stored record could not be encoded or decoded.
    ///
    /// Permanent for the affected record; indicates corruption or a
    /// format change without migration.
    #[error("storage serialization error: {0}")]
    Serialization(String),
}
