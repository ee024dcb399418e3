//! File-backed token store using the platform config directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{StoreError, TokenStore};

/// Directory name under the platform config dir.
const APP_DIR: &str = "authline";

/// A [`TokenStore`] persisted as a single file.
///
/// The file is named after the token key, so several independent
/// sessions (one per service) can share a directory. The token is also
/// cached in memory: reads never touch the disk, and a failed write only
/// costs persistence, never the current session.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: Mutex<Option<String>>,
}

impl FileTokenStore {
    /// Opens the store for `key` inside `dir`, creating `dir` if needed
    /// and loading a previously saved token.
    ///
    /// # Errors
    /// - [`StoreError::InvalidKey`] if `key` is empty or contains a path
    ///   separator
    /// - [`StoreError::Io`] if the directory can't be created or an
    ///   existing token file can't be read
    pub fn open(dir: impl AsRef<Path>, key: &str) -> Result<Self, StoreError> {
        validate_key(key)?;
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(StoreError::Io)?;

        let path = dir.join(key);
        let cached = match fs::read_to_string(&path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::Io(e)),
        };

        tracing::debug!(
            path = %path.display(),
            has_token = cached.is_some(),
            "token store opened"
        );

        Ok(Self {
            path,
            cached: Mutex::new(cached),
        })
    }

    /// Opens the store for `key` under the platform config directory
    /// (e.g. `~/.config/authline/` on Linux).
    ///
    /// # Errors
    /// Same as [`open`](Self::open), plus [`StoreError::NoConfigDir`].
    pub fn open_default(key: &str) -> Result<Self, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Self::open(dir.join(APP_DIR), key)
    }

    /// Path of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, token: &str) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(token.as_bytes())?;
        file.sync_all()
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stores `token` trimmed, the same way [`open`](Self::open) reads it
    /// back. A blank token clears the store.
    fn set(&self, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            self.clear();
            return;
        }
        let mut cached =
            self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(token.to_string());
        if let Err(e) = self.persist(token) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to persist token"
            );
        }
    }

    fn clear(&self) {
        let mut cached =
            self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        cached.take();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove token file"
            ),
        }
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\']);
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
