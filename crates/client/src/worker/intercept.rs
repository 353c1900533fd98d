//! Cache-first request handling.
//!
//! Lookup, then network, then (for navigations only) the cached shell.
//! Each step runs after the previous one settles; nothing is raced.

use reqwest::Method;
use serde::Serialize;
use unmessify_core::{CacheStore, CachedResponse, Error, RequestKey, manifest::SHELL_FALLBACK};

use crate::fetch::{Destination, FetchResponse, Fetcher, Request, Scope};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Served {
    Cache,
    Network,
    /// Cached shell document served for a failed navigation.
    Fallback,
}

/// A response plus its source.
#[derive(Debug, Clone)]
pub struct Intercepted {
    pub response: FetchResponse,
    pub served: Served,
}

/// Answer `request` from `store` if possible, otherwise from the network.
///
/// # Errors
///
/// Returns the network error when the request misses the cache, the network
/// fails, and no shell fallback applies.
pub async fn intercept(
    store: &CacheStore, fetcher: &dyn Fetcher, scope: &Scope, request: &Request,
) -> Result<Intercepted, Error> {
    let key = request.key();
    let cacheable_method = request.method == Method::GET;

    if cacheable_method && let Some(cached) = lookup(store, &key).await {
        tracing::debug!("cache hit for {}", key);
        return Ok(Intercepted { response: FetchResponse::from_cached(&cached)?, served: Served::Cache });
    }

    match fetcher.fetch(request).await {
        Ok(response) => {
            if cacheable_method && response.is_cacheable() {
                if let Err(e) = store.put(&key, &response.to_cached()).await {
                    tracing::warn!(request = %key, error = %e, "failed to store fetched response");
                }
            } else {
                tracing::debug!("not caching {} (status {}, {:?})", key, response.status.as_u16(), response.kind);
            }
            Ok(Intercepted { response, served: Served::Network })
        }
        Err(e) if e.is_network() && request.destination == Destination::Document => {
            let shell = shell_key(scope)?;
            match lookup(store, &shell).await {
                Some(cached) => {
                    tracing::info!(request = %key, error = %e, "offline; serving cached shell");
                    Ok(Intercepted { response: FetchResponse::from_cached(&cached)?, served: Served::Fallback })
                }
                None => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

/// A failed lookup is treated as a miss.
async fn lookup(store: &CacheStore, key: &RequestKey) -> Option<CachedResponse> {
    match store.get(key).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(request = %key, error = %e, "cache lookup failed");
            None
        }
    }
}

fn shell_key(scope: &Scope) -> Result<RequestKey, Error> {
    let url = scope.resolve(SHELL_FALLBACK).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    Ok(Request::navigate(url).key())
}
