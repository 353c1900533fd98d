//! Test doubles for the worker: a scripted network and a storage wrapper
//! that fails deletes on demand.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, header};
use unmessify_core::{AssetManifest, CacheDb, CacheStorage, CachedResponse, Caches, Error, RequestKey};

use crate::fetch::{FetchResponse, Fetcher, Request, ResponseKind, Scope};

pub const ORIGIN: &str = "http://127.0.0.1:8080";

pub fn scope() -> Scope {
    Scope::new(ORIGIN).unwrap()
}

pub async fn caches() -> Caches {
    Caches::new(Arc::new(CacheDb::open_in_memory().await.unwrap()))
}

pub fn key(path: &str) -> RequestKey {
    RequestKey::get(scope().resolve(path).unwrap().as_str())
}

#[derive(Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
}

/// Network that answers from a per-path route table.
///
/// Unknown paths get 404. Paths marked with `fail` return a network error.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Route>>,
    failing: Mutex<HashSet<String>>,
    offline: std::sync::atomic::AtomicBool,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve every manifest path with a body naming the path.
    pub fn serving(manifest: &AssetManifest) -> Arc<Self> {
        let network = Self::new();
        for path in manifest.entries() {
            network.route(path, format!("v1 {path}"));
        }
        network
    }

    pub fn route(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.route_status(path, 200, body);
    }

    pub fn route_status(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route { status, body: body.into() });
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    /// Every request fails.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        let path = request.url.path().to_string();
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(path.clone()).or_default() += 1;

        if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&path) {
            return Err(Error::Network(format!("{} {}: connection refused", request.method, request.url)));
        }

        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or(Route { status: 404, body: Vec::new() });

        let kind = if scope().is_same_origin(&request.url) { ResponseKind::Basic } else { ResponseKind::Cors };
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/plain"));

        Ok(FetchResponse {
            url: request.url.clone(),
            status: StatusCode::from_u16(route.status).unwrap(),
            kind,
            headers,
            bytes: Bytes::from(route.body),
            fetch_ms: 1,
        })
    }
}

/// Storage that refuses to delete the named stores.
pub struct FlakyStorage {
    inner: CacheDb,
    undeletable: HashSet<String>,
}

impl FlakyStorage {
    pub fn new(inner: CacheDb, undeletable: &[&str]) -> Self {
        Self { inner, undeletable: undeletable.iter().map(|s| s.to_string()).collect() }
    }
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        CacheStorage::open(&self.inner, name).await
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.inner.has(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if self.undeletable.contains(name) {
            return Err(Error::InvalidInput(format!("store {name} is locked")));
        }
        self.inner.delete(name).await
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        self.inner.put(name, key, response).await
    }

    async fn get(&self, name: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.inner.get(name, key).await
    }

    async fn entries(&self, name: &str) -> Result<Vec<RequestKey>, Error> {
        self.inner.entries(name).await
    }

    async fn count(&self, name: &str) -> Result<usize, Error> {
        self.inner.count(name).await
    }
}
