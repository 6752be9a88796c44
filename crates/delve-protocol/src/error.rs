//! Error types for the protocol layer.

/// Errors that can occur while encoding or interpreting wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or a
    /// field of the wrong type. The connection handler treats this as a
    /// transport failure and drops the client.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A `move` named a direction other than up/down/left/right.
    ///
    /// Unlike [`Decode`](Self::Decode) this is a rejected command, not a
    /// broken client: the caller gets an error response and stays
    /// connected.
    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),
}
