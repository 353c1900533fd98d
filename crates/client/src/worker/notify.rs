//! Push notification payloads and click handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NOTIFICATION_TITLE: &str = "Unmessify Data Update";
const DEFAULT_BODY: &str = "New data available!";
const ACTION_ICON: &str = "/assets/icon-96.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Displayable notification handed to the host's notification subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the notification for a push message.
    ///
    /// `payload` is the push message text; `None` means the push carried no
    /// data and the generic body is used.
    pub fn for_push(payload: Option<&str>) -> Self {
        Self::for_push_at(payload, Utc::now())
    }

    pub fn for_push_at(payload: Option<&str>, arrived: DateTime<Utc>) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            body: payload.unwrap_or(DEFAULT_BODY).to_string(),
            icon: "/assets/icon-192.png".to_string(),
            badge: "/assets/icon-72.png".to_string(),
            vibrate: vec![100, 50, 100],
            data: NotificationData { date_of_arrival: arrived.timestamp_millis(), primary_key: 1 },
            actions: vec![
                NotificationAction {
                    action: "explore".to_string(),
                    title: "View Data".to_string(),
                    icon: ACTION_ICON.to_string(),
                },
                NotificationAction { action: "close".to_string(), title: "Close".to_string(), icon: ACTION_ICON.to_string() },
            ],
        }
    }
}

/// What the host should do after a notification click.
///
/// The notification itself is always closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    OpenWindow { url: String },
    Dismiss,
}

impl ClickOutcome {
    pub fn for_action(action: Option<&str>) -> Self {
        match action {
            Some("explore") => ClickOutcome::OpenWindow { url: "/".to_string() },
            _ => ClickOutcome::Dismiss,
        }
    }
}
