//! Versioned cache storage abstraction.
//!
//! `CacheStorage` is the backend seam; `Caches` and `CacheStore` are the
//! handles the worker uses. The SQLite `CacheDb` is the shipped backend.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::connection::CacheDb;
use super::entries::{CachedResponse, RequestKey};
use crate::Error;

/// Backend holding any number of named stores of request → response entries.
///
/// Single-entry reads and writes are atomic; concurrent writers to one key
/// resolve as last-write-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if absent.
    async fn open(&self, name: &str) -> Result<(), Error>;

    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Store names, sorted.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Drop a store. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    async fn put(&self, name: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error>;

    async fn get(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error>;

    async fn entries(&self, name: &str) -> Result<Vec<RequestKey>, Error>;

    /// Number of entries in a store; 0 if it does not exist.
    async fn count(&self, name: &str) -> Result<usize, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        if self.create_store(name).await? {
            tracing::debug!(store = name, "created cache store");
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.store_exists(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.list_stores().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.drop_store(name).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        self.upsert_entry(name, key, response).await
    }

    async fn get(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.get_entry(name, key).await
    }

    async fn entries(&self, name: &str) -> Result<Vec<RequestKey>, Error> {
        self.list_entries(name).await
    }

    async fn count(&self, name: &str) -> Result<usize, Error> {
        Ok(self.count_entries(name).await? as usize)
    }
}

/// Outcome of evicting every store but one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    pub deleted: Vec<String>,
    /// (store name, error message)
    pub failed: Vec<(String, String)>,
}

/// Entry point to all stores of a backend.
#[derive(Clone)]
pub struct Caches {
    storage: Arc<dyn CacheStorage>,
}

impl Caches {
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self { storage }
    }

    /// Open (creating if needed) the store for `version`.
    pub async fn open(&self, version: &str) -> Result<CacheStore, Error> {
        self.storage.open(version).await?;
        Ok(CacheStore { storage: Arc::clone(&self.storage), name: version.to_string() })
    }

    pub async fn has(&self, version: &str) -> Result<bool, Error> {
        self.storage.has(version).await
    }

    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.storage.keys().await
    }

    pub async fn delete(&self, version: &str) -> Result<bool, Error> {
        self.storage.delete(version).await
    }

    /// Delete every store whose name is not `keep`.
    ///
    /// A failed deletion is recorded and the remaining stores are still
    /// attempted. Only a failure to enumerate stores is returned as `Err`.
    pub async fn delete_stores_except(&self, keep: &str) -> Result<EvictionReport, Error> {
        let mut report = EvictionReport::default();

        for name in self.storage.keys().await? {
            if name == keep {
                continue;
            }
            match self.storage.delete(&name).await {
                Ok(_) => {
                    tracing::info!(store = %name, "deleted old cache");
                    report.deleted.push(name);
                }
                Err(e) => {
                    tracing::warn!(store = %name, error = %e, "failed to delete old cache");
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}

/// Handle bound to one named store.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn CacheStorage>,
    name: String,
}

impl CacheStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn put(&self, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        self.storage.put(&self.name, key, response).await
    }

    pub async fn get(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.storage.get(&self.name, key).await
    }

    pub async fn entries(&self) -> Result<Vec<RequestKey>, Error> {
        self.storage.entries(&self.name).await
    }

    pub async fn len(&self) -> Result<usize, Error> {
        self.storage.count(&self.name).await
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").field("name", &self.name).finish()
    }
}
