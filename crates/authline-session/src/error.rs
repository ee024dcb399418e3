//! Error types for the session layer.

use authline_protocol::ProtocolError;

/// Errors surfaced by session operations.
///
/// Every variant boils down to a human-readable reason (its `Display`
/// output, also available through [`reason`](Self::reason)). Richer codes
/// the service might send are dropped at this boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The service refused the request: wrong credentials, a taken
    /// username, a bad invitation code, an expired reset token...
    /// The string is the service's own explanation when it gave one.
    #[error("{0}")]
    Rejected(String),

    /// An authenticated call came back with 401. By the time the caller
    /// sees this, the stored token has been dropped and the session is
    /// anonymous.
    #[error("{0}")]
    Unauthorized(String),

    /// The service could not be reached (DNS, refused connection,
    /// timeout). Session state is left untouched.
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with a success status but a body we couldn't
    /// understand.
    #[error("unexpected response from server: {0}")]
    InvalidResponse(String),

    /// Input was rejected locally; no request was sent.
    #[error("{0}")]
    InvalidInput(String),

    /// The operation needs a logged-in session and there isn't one.
    #[error("not logged in")]
    NotAuthenticated,
}

impl SessionError {
    /// The human-readable reason for this error.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
