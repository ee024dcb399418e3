use tracing_subscriber::EnvFilter;

use crate::AuthlineError;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"authline=info"`) when it's unset or invalid.
///
/// Libraries embedding Authline usually install their own subscriber
/// instead; this is for binaries and examples.
///
/// # Errors
/// [`AuthlineError::Tracing`] if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<(), AuthlineError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| AuthlineError::Tracing(e.to_string()))
}
