//! Push payloads and the notifications they raise.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use nammy_core::Error;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

pub const NOTIFICATION_ICON: &str = "/icons/icon-192x192.png";
pub const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

/// Action id that opens the notification target.
pub const ACTION_OPEN: &str = "open";
pub const ACTION_CLOSE: &str = "close";

/// JSON body of a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Page to open when the notification is acted on.
    #[serde(default)]
    pub url: Option<String>,
}

impl PushPayload {
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let payload: Self =
            serde_json::from_slice(bytes).map_err(|e| Error::InvalidInput(format!("push payload: {e}")))?;
        if payload.title.trim().is_empty() {
            return Err(Error::InvalidInput("push payload: title is empty".into()));
        }
        Ok(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Target URL carried to the click handler.
    pub data: Option<String>,
    pub actions: Vec<NotificationAction>,
    /// RFC 3339 timestamp.
    pub shown_at: String,
}

impl Notification {
    fn from_payload(id: u64, payload: PushPayload) -> Self {
        Self {
            id,
            title: payload.title,
            body: payload.body,
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            vibrate: VIBRATE_PATTERN.to_vec(),
            data: payload.url,
            actions: vec![
                NotificationAction {
                    action: ACTION_OPEN.into(),
                    title: "Ver ahora".into(),
                    icon: Some(NOTIFICATION_ICON.into()),
                },
                NotificationAction { action: ACTION_CLOSE.into(), title: "Cerrar".into(), icon: None },
            ],
            shown_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Notifications currently on screen.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: AtomicU64,
    shown: RwLock<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn show(&self, payload: PushPayload) -> Notification {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let notification = Notification::from_payload(id, payload);
        tracing::info!(id, title = %notification.title, "notification shown");
        self.shown.write().await.push(notification.clone());
        notification
    }

    /// Remove a notification; `None` if it was already closed.
    pub async fn close(&self, id: u64) -> Option<Notification> {
        let mut shown = self.shown.write().await;
        let index = shown.iter().position(|n| n.id == id)?;
        Some(shown.remove(index))
    }

    pub async fn list(&self) -> Vec<Notification> {
        self.shown.read().await.clone()
    }
}
