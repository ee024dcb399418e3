//! Error types for the client layer.

use authline_session::SessionError;

/// Errors raised while building or sending a request.
///
/// HTTP error *statuses* are not errors at this level: the wrapper hands
/// every response back, and [`AuthApi`](crate::AuthApi) decides what a
/// 400 or a 401 means.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL doesn't parse.
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL isn't `http` or `https`, or can't take a path.
    #[error("unsupported base URL: {0}")]
    UnsupportedUrl(String),

    /// The underlying HTTP client couldn't be constructed (TLS backend).
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The caller set an `Authorization` header; the wrapper owns it.
    #[error("authorization header must not be set by the caller")]
    AuthorizationPreset,

    /// The stored token contains bytes that can't go in a header.
    #[error("stored token is not a valid header value")]
    MalformedToken,

    /// The request couldn't be assembled, so nothing was sent: a bad
    /// caller-supplied header or a body that won't serialize.
    #[error("invalid request: {0}")]
    Request(#[source] reqwest::Error),

    /// The request never got a response: DNS, refused connection,
    /// timeout, or the body couldn't be read.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Lets `?` turn client failures into the uniform session error.
impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => SessionError::Transport(e.to_string()),
            other => SessionError::InvalidInput(other.to_string()),
        }
    }
}
