//! Protocol error type.

use thiserror::Error;

/// Errors raised while encoding or decoding wire messages.
///
/// All variants are fatal for the frame (and usually the stream) they
/// occurred on, but never for the connection as a whole: the peer may
/// keep sending well-formed frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame length prefix exceeds [`crate::MAX_FRAME_SIZE`].
    ///
    /// Rejected before any allocation to prevent memory exhaustion
    /// from hostile length prefixes.
    #[error("frame of {size} bytes exceeds limit of {max}")]
    FrameTooLarge {
        /// Claimed frame size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// Buffer ended before the full frame arrived.
    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes the frame claims to contain.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// CBOR body could not be decoded into a message.
    #[error("malformed message body: {0}")]
    Decode(String),

    /// Message could not be serialized to CBOR.
    #[error("message encoding failed: {0}")]
    Encode(String),
}
