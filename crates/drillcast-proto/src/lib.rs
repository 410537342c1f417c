//! Drillcast wire protocol.
//!
//! Messages are CBOR-encoded (`ciborium`) and framed on the wire as a
//! `u32` big-endian length prefix followed by the body. CBOR keeps the
//! payloads self-describing and forward-compatible without code
//! generation; the length prefix lets the transport read a whole
//! message before touching the deserializer.
//!
//! The crate is pure data: no I/O, no async. Transports layer the
//! framing over whatever byte stream they use.

mod errors;
mod messages;
mod wire;

pub use errors::ProtocolError;
pub use messages::{
    AlertDelivery, ClientRequest, DeliveryFailure, Drill, DrillReport, ErrorReply, ResponderRow,
    Role, SafeResponse, ServerMessage,
};
pub use wire::{MAX_FRAME_SIZE, PREFIX_SIZE, body_len, decode, decode_body, encode};

/// ALPN protocol identifier negotiated during the TLS handshake.
pub const ALPN_PROTOCOL: &[u8] = b"drillcast";

/// Class sentinel targeting every class at once.
pub const ALL_CLASSES: &str = "ALL";
