use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{StoreError, StoreFuture, UrlStore};

/// A persisted upload URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUpload {
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Store backed by a JSON file.
///
/// Entries are cached in memory and the whole file is rewritten after
/// every mutation. The lock is held across the write so snapshots hit
/// the disk in mutation order.
pub struct FileUrlStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, StoredUpload>>,
}

impl FileUrlStore {
    /// Opens the store at `path`, loading existing entries.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = load_entries(&path).await?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a snapshot of all entries keyed by fingerprint.
    pub async fn entries(&self) -> BTreeMap<String, StoredUpload> {
        self.entries.lock().await.clone()
    }

    /// Removes every entry.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut map = self.entries.lock().await;
        map.clear();
        persist(&self.path, &map).await
    }
}

impl UrlStore for FileUrlStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let map = self.entries.lock().await;
            Ok(map.get(key).map(|e| e.url.clone()))
        })
    }

    fn set<'a>(&'a self, key: &'a str, url: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut map = self.entries.lock().await;
            if map.get(key).is_some_and(|e| e.url == url) {
                return Ok(());
            }
            map.insert(
                key.to_string(),
                StoredUpload {
                    url: url.to_string(),
                    created_at: Utc::now(),
                },
            );
            persist(&self.path, &map).await
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut map = self.entries.lock().await;
            if map.remove(key).is_none() {
                return Ok(());
            }
            persist(&self.path, &map).await
        })
    }
}

/// Loads entries from a JSON file on disk.
async fn load_entries(path: &Path) -> Result<BTreeMap<String, StoredUpload>, StoreError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    let entries: BTreeMap<String, StoredUpload> = serde_json::from_str(&data)?;
    debug!("loaded {} upload url(s) from {:?}", entries.len(), path);
    Ok(entries)
}

/// Writes all entries to disk via a temporary file and rename.
async fn persist(path: &Path, entries: &BTreeMap<String, StoredUpload>) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(entries)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!("persisted {} upload url(s) to {:?}", entries.len(), path);
    Ok(())
}
