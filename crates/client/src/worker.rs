//! The worker: one handle owning every component and every event entry point.

use std::sync::Arc;

use nammy_core::{AppConfig, CacheDb, Error};
use serde::Serialize;
use url::Url;

use crate::classify::{Classifier, RequestClass};
use crate::clients::{ClientRegistry, WindowAction, WindowClient};
use crate::fallback;
use crate::fetch::{Fetcher, Request, RequestMode, Response, resolve};
use crate::lifecycle::{InstallReport, LifecycleController, LifecycleSettings, WorkerState};
use crate::messages::{CacheInfo, ReplyPort, WorkerMessage, WorkerReply};
use crate::notifications::{ACTION_OPEN, Notification, NotificationCenter, PushPayload};
use crate::strategy::{EngineSettings, StrategyEngine};

/// Sync tag with a registered handler.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Completed,
    Ignored,
}

/// What a notification click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ClickOutcome {
    pub closed: bool,
    /// Client that was focused or opened, if the click navigated.
    pub window: Option<WindowClient>,
    pub opened_new: bool,
}

pub struct ServiceWorker {
    config: AppConfig,
    origin: Url,
    db: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    classifier: Classifier,
    engine: StrategyEngine,
    lifecycle: LifecycleController,
    clients: Arc<ClientRegistry>,
    notifications: NotificationCenter,
}

impl ServiceWorker {
    pub fn new(config: AppConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let origin = config.origin_url()?;
        let classifier = Classifier::from_config(&config)?;
        let engine = StrategyEngine::new(db.clone(), Arc::clone(&fetcher), EngineSettings::from_config(&config)?);
        let clients = Arc::new(ClientRegistry::new());
        let lifecycle = LifecycleController::new(
            db.clone(),
            Arc::clone(&fetcher),
            Arc::clone(&clients),
            LifecycleSettings::from_config(&config)?,
        );

        Ok(Self {
            config,
            origin,
            db,
            fetcher,
            classifier,
            engine,
            lifecycle,
            clients,
            notifications: NotificationCenter::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub async fn state(&self) -> WorkerState {
        self.lifecycle.state().await
    }

    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install().await
    }

    /// Install and, once skip-waiting is signalled, activate.
    pub async fn start(&self) -> Result<WorkerState, Error> {
        self.lifecycle.start().await
    }

    pub fn classify(&self, request: &Request) -> RequestClass {
        self.classifier.classify(request)
    }

    /// Answer an intercepted request. Never fails.
    ///
    /// A same-origin navigation also registers the page it loads as a client.
    pub async fn handle_fetch(&self, request: Request) -> Response {
        let state = self.state().await;
        if request.mode == RequestMode::Navigate && request.url.origin() == self.origin.origin() {
            let client = self.clients.attach(request.url.as_str(), state == WorkerState::Active).await;
            tracing::debug!(id = client.id, url = %client.url, controlled = client.controlled, "client attached");
        }
        let outcome = if state == WorkerState::Active {
            let class = self.classify(&request);
            tracing::debug!(url = %request.url, ?class, "fetch");
            self.engine.respond(class, &request).await
        } else {
            tracing::debug!(url = %request.url, %state, "not active; passing through");
            self.fetcher.fetch(&request).await.map_err(Error::from)
        };

        match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "fetch handler failed; serving fallback");
                fallback::for_request(request.is_navigation(), request.is_image())
            }
        }
    }

    /// Handle a message posted by a page. Replies go to `reply` when given.
    pub async fn handle_message(&self, message: WorkerMessage, reply: Option<ReplyPort>) -> Result<(), Error> {
        tracing::debug!(?message, "message received");
        match message {
            WorkerMessage::SkipWaiting => {
                self.lifecycle.skip_waiting();
                self.lifecycle.activate_if_waiting().await?;
            }
            WorkerMessage::GetCacheInfo => {
                let info = self.cache_info().await?;
                if let Some(port) = reply
                    && port.send(WorkerReply::CacheInfo(info)).is_err()
                {
                    tracing::debug!("cache info receiver dropped");
                }
            }
        }
        Ok(())
    }

    /// Live partition names with their entry counts.
    pub async fn cache_info(&self) -> Result<CacheInfo, Error> {
        let static_name = self.config.static_partition();
        let live = [static_name.clone(), self.config.dynamic_partition()];
        let partitions = self.db.partition_info(&live).await?;
        let cache_size = partitions
            .iter()
            .find(|p| p.name == static_name)
            .map_or(0, |p| p.entries);
        Ok(CacheInfo { cache_name: static_name, cache_size, partitions })
    }

    /// Show the notification described by a push payload. No payload shows nothing.
    pub async fn handle_push(&self, payload: Option<&[u8]>) -> Result<Option<Notification>, Error> {
        let Some(bytes) = payload else {
            tracing::debug!("push without payload ignored");
            return Ok(None);
        };
        let payload = PushPayload::parse(bytes)?;
        Ok(Some(self.notifications.show(payload).await))
    }

    /// Close the notification; the `open` action focuses or opens its target.
    pub async fn handle_notification_click(&self, id: u64, action: Option<&str>) -> Result<ClickOutcome, Error> {
        let notification = self
            .notifications
            .close(id)
            .await
            .ok_or_else(|| Error::InvalidInput(format!("no notification with id {id}")))?;

        if action != Some(ACTION_OPEN) {
            return Ok(ClickOutcome { closed: true, window: None, opened_new: false });
        }

        let target = notification.data.as_deref().unwrap_or("/");
        let target = resolve(&self.origin, target).map_err(|e| Error::InvalidUrl(format!("{target}: {e}")))?;
        let navigation = self.clients.open_or_focus(target.as_str()).await;
        let opened_new = matches!(navigation, WindowAction::Opened(_));
        let window = navigation.client().clone();
        tracing::info!(id, url = %window.url, opened_new, "notification opened");
        Ok(ClickOutcome { closed: true, window: Some(window), opened_new })
    }

    pub async fn handle_sync(&self, tag: &str) -> SyncOutcome {
        if tag == BACKGROUND_SYNC_TAG {
            tracing::debug!(tag, "background sync");
            SyncOutcome::Completed
        } else {
            tracing::debug!(tag, "unknown sync tag ignored");
            SyncOutcome::Ignored
        }
    }
}
