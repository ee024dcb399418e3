//! Token persistence for Authline.
//!
//! Provides the [`TokenStore`] trait (a slot holding at most one bearer
//! token) and two implementations:
//!
//! - [`MemoryTokenStore`]: lives as long as the process.
//! - [`FileTokenStore`]: survives restarts (feature `file`, on by default).
//!
//! # Feature Flags
//!
//! - `file` (default): file-backed store under the platform config
//!   directory, via `dirs`.

mod error;
#[cfg(feature = "file")]
mod file;

pub use error::StoreError;
#[cfg(feature = "file")]
pub use file::FileTokenStore;

use std::sync::{Arc, Mutex, PoisonError};

/// A slot holding at most one bearer token.
///
/// None of the operations can fail: a token is either there or it isn't.
/// Validity is never judged locally; only the remote service can say
/// whether a token is still good.
///
/// Methods take `&self` so one store can be shared (through an `Arc`)
/// by the request wrapper and the session coordinator.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the stored token, if any.
    fn get(&self) -> Option<String>;

    /// Stores `token`, replacing whatever was there.
    fn set(&self, token: &str);

    /// Removes the stored token. Clearing an empty store is a no-op.
    fn clear(&self);

    /// Returns `true` if a token is stored.
    fn has_token(&self) -> bool {
        self.get().is_some()
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, token: &str) {
        (**self).set(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// A [`TokenStore`] that keeps the token in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(token.to_string());
    }

    fn clear(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
