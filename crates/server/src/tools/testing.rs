//! Test harness: a static site behind a started worker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use unmessify_client::{Dispatcher, FetchResponse, Fetcher, Request, Scope, Worker};
use unmessify_core::{AssetManifest, CacheDb, CachedResponse, Caches, Error};

use super::ToolContext;

pub const ORIGIN: &str = "http://127.0.0.1:8080";
pub const VERSION: &str = "unmessify-data-v1.0.0";

/// Serves fixed pages; unknown paths get 404.
#[derive(Default)]
pub struct StaticSite {
    pages: Mutex<HashMap<String, (Vec<u8>, String)>>,
    offline: AtomicBool,
}

impl StaticSite {
    /// Every manifest path, with a body naming the path.
    pub fn standard() -> Arc<Self> {
        let site = Arc::new(Self::default());
        for path in AssetManifest::standard().entries() {
            let content_type = if path.ends_with(".json") { "application/json" } else { "text/plain" };
            site.page(path, format!("v1 {path}"), content_type);
        }
        site
    }

    pub fn page(&self, path: &str, body: impl Into<Vec<u8>>, content_type: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), (body.into(), content_type.to_string()));
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StaticSite {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{} {}: offline", request.method, request.url)));
        }

        let page = self.pages.lock().unwrap().get(request.url.path()).cloned();
        let cached = match page {
            Some((body, content_type)) => {
                CachedResponse::new(request.url.as_str(), 200, vec![("content-type".into(), content_type)], body)
            }
            None => CachedResponse::new(request.url.as_str(), 404, Vec::new(), Vec::<u8>::new()),
        };

        let mut response = FetchResponse::from_cached(&cached)?;
        response.fetch_ms = 1;
        Ok(response)
    }
}

/// Context over an installed and activated worker.
pub async fn started(site: &Arc<StaticSite>) -> ToolContext {
    let caches = Caches::new(Arc::new(CacheDb::open_in_memory().await.unwrap()));
    let scope = Scope::new(ORIGIN).unwrap();
    let fetcher: Arc<dyn Fetcher> = site.clone();
    let worker = Worker::new(VERSION, caches.clone(), fetcher, scope.clone(), AssetManifest::standard());

    let (dispatcher, _task) = Dispatcher::spawn_default(Arc::new(worker));
    dispatcher.start().await.unwrap();

    ToolContext { dispatcher, caches, scope, version: VERSION.to_string() }
}

/// The JSON document carried in a tool result.
pub fn output(result: &CallToolResult) -> serde_json::Value {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
