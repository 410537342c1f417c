//! Validation errors.

use thiserror::Error;

/// A request was rejected before any store mutation.
///
/// Validation is terminal for the request: when one of these is
/// raised, nothing was persisted and nothing was broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),
}
