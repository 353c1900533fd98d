//! worker_sync and worker_status tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unmessify_client::{RefreshReport, SYNC_TAG};

use super::{ToolContext, json_result};

/// Parameters for the worker_sync tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncParams {
    /// Sync tag (default: `background-sync`). Other tags are acknowledged but do nothing.
    #[serde(default)]
    pub tag: Option<String>,
}

/// Output from the worker_sync tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerSyncOutput {
    pub tag: String,
    /// Whether the tag triggered a refresh.
    pub refreshed: bool,
    pub report: Option<RefreshReport>,
}

/// Implementation of the worker_sync tool.
pub async fn sync_impl(ctx: &ToolContext, params: WorkerSyncParams) -> Result<CallToolResult, McpError> {
    let tag = params.tag.unwrap_or_else(|| SYNC_TAG.to_string());
    let report = ctx.dispatcher.sync(tag.clone()).await?;

    json_result(&WorkerSyncOutput { tag, refreshed: report.is_some(), report })
}

/// Implementation of the worker_status tool.
pub async fn status_impl(ctx: &ToolContext) -> Result<CallToolResult, McpError> {
    let status = ctx.dispatcher.status().await?;
    json_result(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StaticSite, VERSION, output, started};

    #[tokio::test]
    async fn test_sync_default_tag_refreshes_data() {
        let site = StaticSite::standard();
        let ctx = started(&site).await;
        site.page("/json/VITC-A-L.json", "v2", "application/json");

        let out = output(&sync_impl(&ctx, WorkerSyncParams::default()).await.unwrap());

        assert_eq!(out["tag"], "background-sync");
        assert_eq!(out["refreshed"], true);
        assert_eq!(out["report"]["updated"].as_array().unwrap().len(), 12);

        let store = ctx.caches.open(VERSION).await.unwrap();
        let key = unmessify_core::RequestKey::get("http://127.0.0.1:8080/json/VITC-A-L.json");
        assert_eq!(store.get(&key).await.unwrap().unwrap().body, b"v2");
    }

    #[tokio::test]
    async fn test_sync_other_tag_does_nothing() {
        let ctx = started(&StaticSite::standard()).await;

        let params = WorkerSyncParams { tag: Some("periodic".into()) };
        let out = output(&sync_impl(&ctx, params).await.unwrap());

        assert_eq!(out["refreshed"], false);
        assert!(out["report"].is_null());
    }

    #[tokio::test]
    async fn test_status() {
        let ctx = started(&StaticSite::standard()).await;

        let out = output(&status_impl(&ctx).await.unwrap());

        assert_eq!(out["version"], VERSION);
        assert_eq!(out["state"], "active");
        assert_eq!(out["stores"], serde_json::json!([VERSION]));
        assert_eq!(out["entries"], 19);
    }
}
