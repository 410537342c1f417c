//! Length-prefixed CBOR framing.
//!
//! Wire layout: `[length: u32 big-endian] + [body: CBOR]`. The length
//! counts body bytes only. Both directions enforce
//! [`MAX_FRAME_SIZE`]: encoders refuse to produce oversized frames,
//! decoders refuse hostile length prefixes before allocating.

use bytes::BufMut;
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::ProtocolError;

/// Size of the length prefix in bytes.
pub const PREFIX_SIZE: usize = 4;

/// Maximum body size in bytes (1 MiB).
///
/// Drill payloads are small; the cap exists purely to bound what a
/// hostile peer can make the server allocate.
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// Encode a message into a complete frame (prefix + CBOR body).
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let mut body = Vec::new();
    ciborium::into_writer(msg, &mut body).map_err(|e| ProtocolError::Encode(e.to_string()))?;

    if body.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: body.len(), max: MAX_FRAME_SIZE });
    }

    let mut frame = Vec::with_capacity(PREFIX_SIZE + body.len());
    // Length fits in u32: MAX_FRAME_SIZE (1 MiB) << u32::MAX.
    frame.put_u32(body.len() as u32);
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Validate a length prefix and return the body size to read.
pub fn body_len(prefix: [u8; PREFIX_SIZE]) -> Result<usize, ProtocolError> {
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge { size: len, max: MAX_FRAME_SIZE });
    }
    Ok(len)
}

/// Decode a message from a frame body (prefix already stripped).
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    ciborium::from_reader(body).map_err(|e| ProtocolError::Decode(e.to_string()))
}

/// Decode a message from a complete frame (prefix included).
///
/// Used where the whole frame is already buffered; streaming readers
/// use [`body_len`] + [`decode_body`] instead.
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<T, ProtocolError> {
    if frame.len() < PREFIX_SIZE {
        return Err(ProtocolError::Truncated { needed: PREFIX_SIZE, available: frame.len() });
    }
    let mut prefix = [0u8; PREFIX_SIZE];
    prefix.copy_from_slice(&frame[..PREFIX_SIZE]);
    let len = body_len(prefix)?;

    let body = &frame[PREFIX_SIZE..];
    if body.len() < len {
        return Err(ProtocolError::Truncated { needed: len, available: body.len() });
    }
    decode_body(&body[..len])
}
