//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the worker.
use crate::tools::{
    CacheGetParams, DataFetchParams, NotifyClickParams, NotifyPushParams, ToolContext, WorkerSyncParams, cache_get,
    data_fetch, notify, worker,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for unmessify.
#[derive(Clone)]
pub struct UnmessifyServer {
    tool_router: ToolRouter<Self>,
    ctx: ToolContext,
}

#[tool_router]
impl UnmessifyServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self { tool_router: Self::tool_router(), ctx }
    }

    /// Fetch a path through the offline worker.
    ///
    /// Cached entries are answered without touching the network.
    #[tool(
        description = "Fetch a path through the offline worker. Cache-first; navigations fall back to the cached shell when offline. Returns status, source (cache/network/fallback) and body."
    )]
    async fn data_fetch(&self, params: Parameters<DataFetchParams>) -> Result<CallToolResult, McpError> {
        data_fetch::fetch_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Trigger a background sync. The background-sync tag re-fetches every data document.")]
    async fn worker_sync(&self, params: Parameters<WorkerSyncParams>) -> Result<CallToolResult, McpError> {
        worker::sync_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Report the worker's cache version, lifecycle state, cache stores and entry count.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        worker::status_impl(&self.ctx).await
    }

    #[tool(description = "Read one entry from the current cache store without using the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache_get::get_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Build the notification shown for a push message.")]
    async fn notify_push(&self, params: Parameters<NotifyPushParams>) -> Result<CallToolResult, McpError> {
        notify::push_impl(&self.ctx, params.0).await
    }

    #[tool(description = "Resolve a notification click. The explore action opens the app root; anything else dismisses.")]
    async fn notify_click(&self, params: Parameters<NotifyClickParams>) -> Result<CallToolResult, McpError> {
        notify::click_impl(&self.ctx, params.0).await
    }
}

impl ServerHandler for UnmessifyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "unmessify".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
