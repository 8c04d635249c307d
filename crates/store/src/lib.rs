//! Persistent mapping from upload fingerprints to upload URLs.
//!
//! The upload controller records the server-assigned URL under the
//! upload's fingerprint so a later attempt can find and resume it.

mod file;
mod memory;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

pub use file::{FileUrlStore, StoredUpload};
pub use memory::MemoryUrlStore;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Future returned by [`UrlStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Key-value store of fingerprint → absolute upload URL.
///
/// `get` on a missing key yields `Ok(None)`. `set` and `remove` are
/// idempotent.
pub trait UrlStore: Send + Sync {
    /// Returns the URL stored under `key`, if any.
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Stores `url` under `key`, replacing any previous value.
    fn set<'a>(&'a self, key: &'a str, url: &'a str) -> StoreFuture<'a, ()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Returns the default store path (`<config>/tusk/uploads.json`).
pub fn default_store_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("tusk").join("uploads.json"))
}

/// Returns the platform-specific config directory.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config"))
    }
}
