//! Error types for the protocol layer.
//!
//! Each crate in Authline defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in (de)serialization of a
//! payload, not in networking or session bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: the service answered with HTML (a proxy error
    /// page), a field is missing, or a role we don't know about.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
