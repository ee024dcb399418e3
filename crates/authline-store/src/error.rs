/// Errors that can occur while opening a token store.
///
/// Once a store is open, its operations never fail: persistence problems
/// are logged and the in-memory copy stays authoritative.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No per-user configuration directory exists on this platform.
    #[error("could not determine a configuration directory")]
    NoConfigDir,

    /// The token key can't be used as a file name.
    #[error("invalid token key: {0:?}")]
    InvalidKey(String),

    /// Creating the store directory or reading the token file failed.
    #[error("token store I/O failed: {0}")]
    Io(#[source] std::io::Error),
}
