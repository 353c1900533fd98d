//! cache_get tool implementation.
//!
//! Reads one entry from the current version's store without touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unmessify_core::{Error, RequestKey};

use super::{BodyEncoding, ToolContext, encode_body, json_result, parse_method};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Path relative to the origin, or an absolute URL.
    pub path: String,

    /// HTTP method of the stored request (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// Store the entry was read from.
    pub store: String,
    /// Request key, `METHOD URL`.
    pub key: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub encoding: BodyEncoding,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(ctx: &ToolContext, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = ctx
        .scope
        .resolve(&params.path)
        .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = parse_method(params.method.as_deref())?;
    let key = RequestKey::new(method.as_str(), url.as_str());

    if !ctx.caches.has(&ctx.version).await? {
        return Err(Error::CacheMiss(format!("no store for {}", ctx.version)).into());
    }

    let store = ctx.caches.open(&ctx.version).await?;
    let cached = store
        .get(&key)
        .await?
        .ok_or_else(|| Error::CacheMiss(key.to_string()))?;

    let (body, encoding) = encode_body(&cached.body);
    let output = CacheGetOutput {
        store: store.name().to_string(),
        key: key.to_string(),
        url: cached.url,
        status: cached.status,
        headers: cached.headers,
        body,
        encoding,
        stored_at: cached.stored_at,
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticSite, VERSION, output, started};

    fn params(path: &str) -> CacheGetParams {
        CacheGetParams { path: path.to_string(), method: None }
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let ctx = started(&StaticSite::standard()).await;

        let result = get_impl(&ctx, params("/json/VITC-CB-L.json")).await.unwrap();
        let out: CacheGetOutput = serde_json::from_value(output(&result)).unwrap();

        assert_eq!(out.store, VERSION);
        assert_eq!(out.key, "GET http://127.0.0.1:8080/json/VITC-CB-L.json");
        assert_eq!(out.status, 200);
        assert_eq!(out.body, "v1 /json/VITC-CB-L.json");
        assert_eq!(out.encoding, BodyEncoding::Utf8);
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let ctx = started(&StaticSite::standard()).await;

        let err = get_impl(&ctx, params("/json/nope.json")).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_other_method_is_separate_entry() {
        let ctx = started(&StaticSite::standard()).await;

        let params = CacheGetParams { method: Some("HEAD".into()), ..params("/index.html") };
        assert!(get_impl(&ctx, params).await.is_err());
    }
}
