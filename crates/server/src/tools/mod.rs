//! MCP tool implementations.
//!
//! Every tool goes through the worker's `DispatcherHandle` except `cache_get`,
//! which reads the current store directly.

pub mod cache_get;
pub mod data_fetch;
pub mod notify;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unmessify_client::{DispatcherHandle, Method, Scope};
use unmessify_core::{Caches, Error};

pub use cache_get::CacheGetParams;
pub use data_fetch::DataFetchParams;
pub use notify::{NotifyClickParams, NotifyPushParams};
pub use worker::WorkerSyncParams;

/// Handles shared by every tool.
#[derive(Clone)]
pub struct ToolContext {
    pub dispatcher: DispatcherHandle,
    pub caches: Caches,
    pub scope: Scope,
    /// Cache version the worker owns.
    pub version: String,
}

/// How a response body is rendered in tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Utf8,
    Hex,
}

/// Bodies that are valid UTF-8 are returned as text, anything else as hex.
pub fn encode_body(bytes: &[u8]) -> (String, BodyEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), BodyEncoding::Utf8),
        Err(_) => (hex::encode(bytes), BodyEncoding::Hex),
    }
}

/// Parse an HTTP method name, defaulting to GET.
pub fn parse_method(method: Option<&str>) -> Result<Method, Error> {
    let Some(method) = method.map(str::trim) else {
        return Ok(Method::GET);
    };
    if method.is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()));
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::InvalidInput(format!("invalid method: {method}")))
}

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_body_text() {
        let (body, encoding) = encode_body(br#"{"menu":[]}"#);
        assert_eq!(body, r#"{"menu":[]}"#);
        assert_eq!(encoding, BodyEncoding::Utf8);
    }

    #[test]
    fn test_encode_body_binary() {
        let (body, encoding) = encode_body(&[0x89, 0x50, 0x4e, 0x47, 0xff]);
        assert_eq!(body, "89504e47ff");
        assert_eq!(encoding, BodyEncoding::Hex);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method(None).unwrap(), Method::GET);
        assert_eq!(parse_method(Some("post")).unwrap(), Method::POST);
        assert!(parse_method(Some("")).is_err());
        assert!(parse_method(Some("GE T")).is_err());
    }
}
