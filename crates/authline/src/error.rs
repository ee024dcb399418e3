//! Unified error type for Authline.

use std::path::PathBuf;

use authline_client::ClientError;
use authline_protocol::ProtocolError;
use authline_session::SessionError;
use authline_store::StoreError;

/// Problems with the configuration file or environment overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting has a value that can't be used.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `authline` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum AuthlineError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The token store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP client could not be built or a request failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A payload could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A global tracing subscriber was already installed.
    #[error("failed to initialize tracing: {0}")]
    Tracing(String),
}
