//! Offline worker lifecycle.
//!
//! A `Worker` owns one cache version and moves through
//! `Unregistered → Installing → Installed → Activating → Active → Redundant`.
//! Only install runs while `Installing` and only eviction while
//! `Activating`. Requests are intercepted and sync events honoured only
//! while `Active`.

pub mod activate;
mod batch;
pub mod dispatch;
pub mod install;
pub mod intercept;
pub mod notify;
pub mod refresh;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use unmessify_core::{AppConfig, AssetManifest, CacheStorage, Caches, Error, EvictionReport};

use crate::fetch::{FetchClient, FetchConfig, Fetcher, Request, Scope};

pub use batch::PathFailure;
pub use dispatch::{Dispatcher, DispatcherHandle, WorkerEvent};
pub use install::InstallReport;
pub use intercept::{Intercepted, Served};
pub use notify::{ClickOutcome, Notification};
pub use refresh::{RefreshReport, SYNC_TAG};

/// Lifecycle position of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Unregistered,
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Unregistered => "unregistered",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Snapshot of a worker and its storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct WorkerStatus {
    pub version: String,
    pub state: WorkerState,
    pub stores: Vec<String>,
    /// Entries in the current version's store.
    pub entries: usize,
}

/// One cache version's worker.
pub struct Worker {
    version: String,
    caches: Caches,
    fetcher: Arc<dyn Fetcher>,
    scope: Scope,
    manifest: AssetManifest,
    state: RwLock<WorkerState>,
}

impl Worker {
    pub fn new(
        version: impl Into<String>, caches: Caches, fetcher: Arc<dyn Fetcher>, scope: Scope, manifest: AssetManifest,
    ) -> Self {
        Self {
            version: version.into(),
            caches,
            fetcher,
            scope,
            manifest,
            state: RwLock::new(WorkerState::Unregistered),
        }
    }

    /// Worker over the standard manifest with a reqwest client built from config.
    pub fn from_config(config: &AppConfig, storage: Arc<dyn CacheStorage>) -> Result<Self, Error> {
        let scope = Scope::new(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let client = FetchClient::new(FetchConfig::from(config), scope.clone())?;
        Ok(Self::new(
            config.cache_version.clone(),
            Caches::new(storage),
            Arc::new(client),
            scope,
            AssetManifest::standard(),
        ))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn transition(&self, event: &str, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState(format!("cannot {event} {} while {}", self.version, *state)));
        }
        *state = to;
        tracing::info!(version = %self.version, state = %to, "worker state changed");
        Ok(())
    }

    async fn set_state(&self, to: WorkerState) {
        *self.state.write().await = to;
        tracing::info!(version = %self.version, state = %to, "worker state changed");
    }

    /// Populate this version's store from the manifest.
    ///
    /// Entry failures leave a partial cache and still count as installed.
    /// If the store itself cannot be opened the worker becomes redundant.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition("install", WorkerState::Unregistered, WorkerState::Installing)
            .await?;

        let store = match self.caches.open(&self.version).await {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(version = %self.version, error = %e, "cache install failed");
                self.set_state(WorkerState::Redundant).await;
                return Err(e);
            }
        };

        let report = install::populate(&store, &self.fetcher, &self.scope, &self.manifest).await;
        self.set_state(WorkerState::Installed).await;
        Ok(report)
    }

    /// Take control: evict stale stores and start serving.
    pub async fn activate(&self) -> Result<EvictionReport, Error> {
        self.transition("activate", WorkerState::Installed, WorkerState::Activating)
            .await?;

        let report = activate::evict_stale(&self.caches, &self.version).await;
        self.set_state(WorkerState::Active).await;
        Ok(report)
    }

    /// Handle an outgoing request.
    ///
    /// An inactive worker does not control requests; they go straight to
    /// the network and nothing is cached.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Intercepted, Error> {
        let state = self.state().await;
        if state != WorkerState::Active {
            tracing::debug!(state = %state, "worker not active; passing {} {} through", request.method, request.url);
            let response = self.fetcher.fetch(request).await?;
            return Ok(Intercepted { response, served: Served::Network });
        }

        let store = self.caches.open(&self.version).await?;
        intercept::intercept(&store, self.fetcher.as_ref(), &self.scope, request).await
    }

    /// Handle a sync event. Returns `None` for tags other than [`SYNC_TAG`].
    pub async fn handle_sync(&self, tag: &str) -> Result<Option<RefreshReport>, Error> {
        let state = self.state().await;
        if state != WorkerState::Active {
            return Err(Error::InvalidState(format!("cannot sync {} while {state}", self.version)));
        }
        if tag != SYNC_TAG {
            tracing::debug!(tag, "ignoring sync tag");
            return Ok(None);
        }

        let store = self.caches.open(&self.version).await?;
        Ok(Some(refresh::refresh(&store, &self.fetcher, &self.scope, &self.manifest).await))
    }

    pub fn handle_push(&self, payload: Option<&str>) -> Notification {
        Notification::for_push(payload)
    }

    pub fn handle_notification_click(&self, action: Option<&str>) -> ClickOutcome {
        let outcome = ClickOutcome::for_action(action);
        tracing::debug!(?action, ?outcome, "notification clicked");
        outcome
    }

    /// Retire this worker in favour of a newer version.
    pub async fn supersede(&self) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state == WorkerState::Redundant {
            return Err(Error::InvalidState(format!("{} is already redundant", self.version)));
        }
        *state = WorkerState::Redundant;
        tracing::info!(version = %self.version, "worker superseded");
        Ok(())
    }

    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        let state = self.state().await;
        let stores = self.caches.keys().await?;
        let entries = if stores.iter().any(|s| s == &self.version) {
            self.caches.open(&self.version).await?.len().await?
        } else {
            0
        };
        Ok(WorkerStatus { version: self.version.clone(), state, stores, entries })
    }
}
