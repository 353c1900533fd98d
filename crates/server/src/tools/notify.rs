//! notify_push and notify_click tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ToolContext, json_result};

/// Parameters for the notify_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotifyPushParams {
    /// Push message text. A generic body is used when omitted.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Parameters for the notify_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotifyClickParams {
    /// Action id of the clicked button (`explore` or `close`).
    /// Omit for a click on the notification body.
    #[serde(default)]
    pub action: Option<String>,
}

/// Implementation of the notify_push tool.
pub async fn push_impl(ctx: &ToolContext, params: NotifyPushParams) -> Result<CallToolResult, McpError> {
    let notification = ctx.dispatcher.push(params.payload).await?;
    json_result(&notification)
}

/// Implementation of the notify_click tool.
pub async fn click_impl(ctx: &ToolContext, params: NotifyClickParams) -> Result<CallToolResult, McpError> {
    let outcome = ctx.dispatcher.notification_click(params.action).await?;
    json_result(&outcome)
}
