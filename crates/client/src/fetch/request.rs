//! Request and response types passed through the worker.

use bytes::Bytes;
use reqwest::{Method, StatusCode, Url, header};
use serde::{Deserialize, Serialize};
use unmessify_core::{CachedResponse, RequestKey};

/// What the requester intends to do with the response.
///
/// Only `Document` requests are eligible for the offline shell fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Top-level navigation.
    Document,
    Script,
    Style,
    Image,
    Manifest,
    /// Anything else, including `fetch()` of JSON data.
    #[default]
    Other,
}

impl Destination {
    /// Guess the destination from a URL path.
    pub fn infer(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or("");
        let ext = file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());

        if file.is_empty() {
            return Destination::Document;
        }
        if file == "manifest.json" || file.ends_with(".webmanifest") {
            return Destination::Manifest;
        }
        match ext.as_deref() {
            Some("html" | "htm") => Destination::Document,
            Some("js" | "mjs") => Destination::Script,
            Some("css") => Destination::Style,
            Some("png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico") => Destination::Image,
            _ => Destination::Other,
        }
    }
}

/// An outgoing request seen by the worker.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
}

impl Request {
    pub fn new(method: Method, url: Url, destination: Destination) -> Self {
        Self { method, url, destination }
    }

    /// GET with the destination inferred from the path.
    pub fn get(url: Url) -> Self {
        let destination = Destination::infer(url.path());
        Self { method: Method::GET, url, destination }
    }

    /// A top-level navigation.
    pub fn navigate(url: Url) -> Self {
        Self { method: Method::GET, url, destination: Destination::Document }
    }

    /// Cache identity of this request. The fragment is never part of it.
    pub fn key(&self) -> RequestKey {
        let mut url = self.url.clone();
        url.set_fragment(None);
        RequestKey::new(self.method.as_str(), url.as_str())
    }
}

/// How the response relates to the worker scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin.
    Basic,
    /// Cross-origin.
    Cors,
}

/// A response, from the network or reconstructed from the cache.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub kind: ResponseKind,
    pub headers: header::HeaderMap,
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds (0 for cached responses)
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Any 2xx status.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Same-origin and exactly 200: the only responses copied into the cache
    /// on a miss.
    pub fn is_cacheable(&self) -> bool {
        self.kind == ResponseKind::Basic && self.status == StatusCode::OK
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Copy for storage. Headers that are not valid UTF-8 are skipped.
    pub fn to_cached(&self) -> CachedResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();
        CachedResponse::new(self.url.as_str(), self.status.as_u16(), headers, self.bytes.to_vec())
    }

    /// Rebuild a response from a stored entry.
    ///
    /// Entries only ever hold same-origin responses, so the kind is `Basic`.
    pub fn from_cached(cached: &CachedResponse) -> Result<Self, unmessify_core::Error> {
        let url = Url::parse(&cached.url).map_err(|e| unmessify_core::Error::CorruptEntry(e.to_string()))?;
        let status = StatusCode::from_u16(cached.status)
            .map_err(|e| unmessify_core::Error::CorruptEntry(format!("status {}: {e}", cached.status)))?;

        let mut headers = header::HeaderMap::new();
        for (name, value) in &cached.headers {
            if let (Ok(name), Ok(value)) =
                (header::HeaderName::from_bytes(name.as_bytes()), header::HeaderValue::from_str(value))
            {
                headers.append(name, value);
            }
        }

        Ok(Self {
            url,
            status,
            kind: ResponseKind::Basic,
            headers,
            bytes: Bytes::from(cached.body.clone()),
            fetch_ms: 0,
        })
    }
}
