//! data_fetch tool implementation.
//!
//! Sends a request through the worker's fetch interceptor.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unmessify_client::{Destination, Intercepted, Request, Served};
use unmessify_core::Error;

use super::{BodyEncoding, ToolContext, encode_body, json_result, parse_method};

/// Parameters for the data_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataFetchParams {
    /// Path relative to the origin (e.g. `/json/VITC-A-L.json`) or an absolute URL.
    pub path: String,

    /// HTTP method (default: GET). Only GET requests are answered from or written to the cache.
    #[serde(default)]
    pub method: Option<String>,

    /// Request destination. Inferred from the path when omitted.
    /// Only `document` requests fall back to the cached shell when offline.
    #[serde(default)]
    pub destination: Option<Destination>,
}

/// Output from the data_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DataFetchOutput {
    /// URL the response was served from.
    pub url: String,
    pub status: u16,
    /// `cache`, `network` or `fallback`.
    pub source: Served,
    pub content_type: Option<String>,
    pub body: String,
    pub encoding: BodyEncoding,
    /// Network time in milliseconds (0 when served from the cache).
    pub fetch_ms: u64,
}

/// Implementation of the data_fetch tool.
pub async fn fetch_impl(ctx: &ToolContext, params: DataFetchParams) -> Result<CallToolResult, McpError> {
    let url = ctx
        .scope
        .resolve(&params.path)
        .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = parse_method(params.method.as_deref())?;
    let destination = params
        .destination
        .unwrap_or_else(|| Destination::infer(url.path()));

    let Intercepted { response, served } = ctx.dispatcher.fetch(Request::new(method, url, destination)).await?;
    tracing::debug!(url = %response.url, status = response.status.as_u16(), source = ?served, "data_fetch");

    let (body, encoding) = encode_body(&response.bytes);
    let output = DataFetchOutput {
        url: response.url.to_string(),
        status: response.status.as_u16(),
        source: served,
        content_type: response.content_type().map(str::to_string),
        body,
        encoding,
        fetch_ms: response.fetch_ms,
    };

    json_result(&output)
}
