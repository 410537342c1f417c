//! Server error types.
//!
//! One error enum spanning startup (configuration, transport bind)
//! and steady-state operation (driver processing, storage, protocol
//! violations). Per-request failures that a client can act on are
//! reported as [`drillcast_proto::ErrorReply`] messages instead and
//! never surface here.

use std::fmt;

use crate::storage::StorageError;

/// Errors that can occur in the server.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration error (invalid bind address, missing TLS certs,
    /// unreadable roster file).
    ///
    /// Fatal before startup completes. Fix configuration and restart.
    Config(String),

    /// Transport/network error (bind failure, I/O error).
    ///
    /// May be transient (network issues) or fatal (bind address in
    /// use). Check error message for details.
    Transport(String),

    /// Protocol error (malformed frame, oversized payload).
    ///
    /// A client sent data the codec rejects. Fatal for that
    /// connection, the server keeps serving other clients.
    Protocol(String),

    /// Session not found in registry.
    ///
    /// A request arrived for a session that was never accepted or was
    /// already closed. Transient around disconnects.
    SessionNotFound(u64),

    /// Storage operation failed.
    ///
    /// Wraps errors from the drill store. See [`StorageError`] for
    /// cause.
    Storage(StorageError),

    /// Internal error (unexpected state, logic bug).
    ///
    /// Should never happen in a correct build. Report as issue.
    Internal(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::SessionNotFound(id) => write!(f, "session not found: {id}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<drillcast_proto::ProtocolError> for ServerError {
    fn from(err: drillcast_proto::ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
