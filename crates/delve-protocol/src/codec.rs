//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The server only needs "bytes in, command out" and "response in, bytes
//! out". Keeping that behind [`Codec`] means the connection handler never
//! names `serde_json` directly.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output matters for the TCP transport: a frame is one line, and
/// `serde_json::to_vec` never emits a raw newline.
///
/// ```rust
/// use delve_protocol::{Codec, Command, JsonCodec};
///
/// let codec = JsonCodec;
/// let cmd: Command = codec.decode(br#"{"type":"move","direction":"up"}"#).unwrap();
/// assert_eq!(cmd, Command::Move { direction: "up".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
