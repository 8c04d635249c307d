use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use crate::{StoreError, StoreFuture, UrlStore};

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    urls: RwLock<HashMap<String, String>>,
}

impl MemoryUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Copy of every entry, readable without awaiting.
    pub fn snapshot(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>, StoreError> {
        self.urls.read().map_err(|_| StoreError::Poisoned)
    }

    fn get_sync(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set_sync(&self, key: &str, url: &str) -> Result<(), StoreError> {
        let mut map = self.urls.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(key.to_string(), url.to_string());
        Ok(())
    }

    fn remove_sync(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.urls.write().map_err(|_| StoreError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}

impl UrlStore for MemoryUrlStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { self.get_sync(key) })
    }

    fn set<'a>(&'a self, key: &'a str, url: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.set_sync(key, url) })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.remove_sync(key) })
    }
}
