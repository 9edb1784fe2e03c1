//! Window clients attached to the worker.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;

/// A page the worker can control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct WindowClient {
    pub id: u64,
    pub url: String,
    pub focused: bool,
    pub controlled: bool,
}

/// Result of [`ClientRegistry::open_or_focus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowAction {
    Focused(WindowClient),
    Opened(WindowClient),
}

impl WindowAction {
    pub fn client(&self) -> &WindowClient {
        match self {
            WindowAction::Focused(c) | WindowAction::Opened(c) => c,
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientRegistry {
    next_id: AtomicU64,
    clients: RwLock<Vec<WindowClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the page a navigation loads.
    ///
    /// A page already showing `url` is reused. Only an active worker controls
    /// the pages it loads; the rest wait for [`ClientRegistry::claim`].
    pub async fn attach(&self, url: impl Into<String>, controlled: bool) -> WindowClient {
        let url = url.into();
        let mut clients = self.clients.write().await;
        if let Some(existing) = clients.iter_mut().find(|c| c.url == url) {
            existing.controlled |= controlled;
            return existing.clone();
        }

        let client = WindowClient {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            url,
            focused: false,
            controlled,
        };
        clients.push(client.clone());
        client
    }

    pub async fn list(&self) -> Vec<WindowClient> {
        self.clients.read().await.clone()
    }

    /// Take control of every attached client. Returns how many changed.
    pub async fn claim(&self) -> usize {
        let mut clients = self.clients.write().await;
        let mut claimed = 0;
        for client in clients.iter_mut().filter(|c| !c.controlled) {
            client.controlled = true;
            claimed += 1;
        }
        claimed
    }

    /// Focus a client already showing `url`, or open a new controlled one.
    pub async fn open_or_focus(&self, url: &str) -> WindowAction {
        let mut clients = self.clients.write().await;
        for client in clients.iter_mut() {
            client.focused = false;
        }

        if let Some(existing) = clients.iter_mut().find(|c| c.url == url) {
            existing.focused = true;
            return WindowAction::Focused(existing.clone());
        }

        let opened = WindowClient {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            url: url.to_string(),
            focused: true,
            controlled: true,
        };
        clients.push(opened.clone());
        WindowAction::Opened(opened)
    }
}
