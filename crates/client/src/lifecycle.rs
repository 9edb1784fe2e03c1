//! Worker lifecycle: install, wait, activate.
//!
//! ```text
//! Installing ──► Waiting ──► Activating ──► Active
//!      │            │             │            │
//!      └────────────┴─────────────┴────────────┴──► Redundant
//! ```
//!
//! Install pre-populates the static partition from the precache manifest.
//! Activation prunes every partition outside the live set and claims the
//! attached clients.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use nammy_core::{AppConfig, CacheDb, ConfigError, Error, InstallPolicy, RequestKey, StoredResponse};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::clients::ClientRegistry;
use crate::fetch::{Destination, Fetcher, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Installing,
    Waiting,
    Activating,
    Active,
    Redundant,
}

impl WorkerState {
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Installing, Waiting)
                | (Waiting, Activating)
                | (Activating, Active)
                | (Installing | Waiting | Activating | Active, Redundant)
        )
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkerState::Installing => "installing",
            WorkerState::Waiting => "waiting",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        })
    }
}

/// Partition names, manifest and install policy for one worker version.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub static_partition: String,
    pub dynamic_partition: String,
    pub manifest: Vec<Url>,
    pub policy: InstallPolicy,
}

impl LifecycleSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            static_partition: config.static_partition(),
            dynamic_partition: config.dynamic_partition(),
            manifest: config.precache_manifest()?,
            policy: config.install_policy,
        })
    }

    fn live(&self) -> [String; 2] {
        [self.static_partition.clone(), self.dynamic_partition.clone()]
    }
}

/// Outcome of a completed install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub stored: usize,
    pub skipped: Vec<String>,
}

/// Outcome of a completed activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub claimed: usize,
}

pub struct LifecycleController {
    db: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<ClientRegistry>,
    settings: LifecycleSettings,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
    /// Held for the whole of install or activate.
    step: Mutex<()>,
}

impl LifecycleController {
    pub fn new(
        db: CacheDb, fetcher: Arc<dyn Fetcher>, clients: Arc<ClientRegistry>, settings: LifecycleSettings,
    ) -> Self {
        Self {
            db,
            fetcher,
            clients,
            settings,
            state: RwLock::new(WorkerState::Installing),
            skip_waiting: AtomicBool::new(false),
            step: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    async fn transition(&self, next: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !state.can_transition_to(next) {
            return Err(Error::InvalidState(format!("{} -> {}", *state, next)));
        }
        tracing::info!(from = %*state, to = %next, "lifecycle transition");
        *state = next;
        Ok(())
    }

    /// Open both partitions and pre-populate the static one.
    ///
    /// # Errors
    ///
    /// `InvalidState` when not installing; `InstallFailed` when the atomic
    /// policy sees a failed entry or the batch write fails. Either install
    /// failure leaves the worker `Redundant`.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let _step = self.step.lock().await;
        let current = self.state().await;
        if current != WorkerState::Installing {
            return Err(Error::InvalidState(format!("install from {current}")));
        }

        match self.populate().await {
            Ok(report) => {
                self.transition(WorkerState::Waiting).await?;
                self.skip_waiting.store(true, Ordering::SeqCst);
                tracing::info!(stored = report.stored, skipped = report.skipped.len(), "install complete");
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                self.transition(WorkerState::Redundant).await?;
                Err(e)
            }
        }
    }

    async fn populate(&self) -> Result<InstallReport, Error> {
        let partition = self.db.open_partition(&self.settings.static_partition).await?;
        self.db.open_partition(&self.settings.dynamic_partition).await?;

        let fetches = self.settings.manifest.iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            let request = Request::get(url.clone()).with_destination(Destination::infer(url));
            async move {
                let outcome = fetcher.fetch(&request).await;
                (request, outcome)
            }
        });

        let mut items: Vec<(RequestKey, StoredResponse)> = Vec::new();
        let mut skipped = Vec::new();
        for (request, outcome) in join_all(fetches).await {
            let failure = match outcome {
                Ok(response) if response.ok() => {
                    items.push((request.cache_key(), response.to_stored()));
                    continue;
                }
                Ok(response) => format!("{}: status {}", request.url, response.status),
                Err(e) => format!("{}: {e}", request.url),
            };
            match self.settings.policy {
                InstallPolicy::Atomic => return Err(Error::InstallFailed(failure)),
                InstallPolicy::BestEffort => {
                    tracing::warn!(entry = %failure, "precache entry skipped");
                    skipped.push(request.url.to_string());
                }
            }
        }

        let stored = partition
            .put_all(items)
            .await
            .map_err(|e| Error::InstallFailed(e.to_string()))?;
        Ok(InstallReport { stored, skipped })
    }

    /// Ask a waiting worker to activate as soon as possible.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Activate a waiting worker: prune superseded partitions, recreate live
    /// ones and claim clients.
    ///
    /// Returns `None` when another caller already activated it, or when there
    /// is nothing waiting.
    pub async fn activate_if_waiting(&self) -> Result<Option<ActivationReport>, Error> {
        let _step = self.step.lock().await;
        let current = self.state().await;
        if current != WorkerState::Waiting {
            tracing::debug!(state = %current, "activation skipped");
            return Ok(None);
        }
        self.activate().await.map(Some)
    }

    async fn activate(&self) -> Result<ActivationReport, Error> {
        self.transition(WorkerState::Activating).await?;

        let live = self.settings.live();
        let deleted = match self.db.prune_except(&live).await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.transition(WorkerState::Redundant).await?;
                return Err(e);
            }
        };
        for name in &deleted {
            tracing::info!(partition = %name, "deleted superseded partition");
        }
        for name in &live {
            self.db.open_partition(name).await?;
        }

        let claimed = self.clients.claim().await;
        self.transition(WorkerState::Active).await?;
        Ok(ActivationReport { deleted, claimed })
    }

    /// Install, then activate if skip-waiting was signalled.
    pub async fn start(&self) -> Result<WorkerState, Error> {
        self.install().await?;
        if self.skip_waiting_requested() {
            self.activate_if_waiting().await?;
        }
        Ok(self.state().await)
    }
}
