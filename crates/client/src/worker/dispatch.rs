//! Event queue in front of a [`Worker`].
//!
//! Lifecycle events (install, activate, status) run to completion in queue
//! order, so an install always finishes before the activate queued after it,
//! and activation finishes before any later fetch is looked at. Fetch and
//! sync events are spawned once dequeued so a slow network request does not
//! hold up the queue.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use unmessify_core::{Error, EvictionReport};

use super::{ClickOutcome, InstallReport, Intercepted, Notification, RefreshReport, Worker, WorkerStatus};
use crate::fetch::Request;

/// Queue depth used by [`Dispatcher::spawn_default`].
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, Error>>;

/// An event delivered to the worker, with the channel its result goes back on.
pub enum WorkerEvent {
    Install { reply: Reply<InstallReport> },
    Activate { reply: Reply<EvictionReport> },
    Fetch { request: Request, reply: Reply<Intercepted> },
    Sync { tag: String, reply: Reply<Option<RefreshReport>> },
    Push { payload: Option<String>, reply: Reply<Notification> },
    NotificationClick { action: Option<String>, reply: Reply<ClickOutcome> },
    Status { reply: Reply<WorkerStatus> },
}

impl WorkerEvent {
    fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Install { .. } => "install",
            WorkerEvent::Activate { .. } => "activate",
            WorkerEvent::Fetch { .. } => "fetch",
            WorkerEvent::Sync { .. } => "sync",
            WorkerEvent::Push { .. } => "push",
            WorkerEvent::NotificationClick { .. } => "notificationclick",
            WorkerEvent::Status { .. } => "status",
        }
    }
}

pub struct Dispatcher;

impl Dispatcher {
    /// Start draining events for `worker` on the current runtime.
    ///
    /// The loop ends once every [`DispatcherHandle`] is dropped.
    pub fn spawn(worker: Arc<Worker>, depth: usize) -> (DispatcherHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        let task = tokio::spawn(run(worker, rx));
        (DispatcherHandle { tx }, task)
    }

    pub fn spawn_default(worker: Arc<Worker>) -> (DispatcherHandle, JoinHandle<()>) {
        Self::spawn(worker, DEFAULT_QUEUE_DEPTH)
    }
}

async fn run(worker: Arc<Worker>, mut rx: mpsc::Receiver<WorkerEvent>) {
    while let Some(event) = rx.recv().await {
        tracing::trace!(event = event.name(), version = worker.version(), "dispatching worker event");

        match event {
            WorkerEvent::Install { reply } => {
                let _ = reply.send(worker.install().await);
            }
            WorkerEvent::Activate { reply } => {
                let _ = reply.send(worker.activate().await);
            }
            WorkerEvent::Status { reply } => {
                let _ = reply.send(worker.status().await);
            }
            WorkerEvent::Fetch { request, reply } => {
                let worker = Arc::clone(&worker);
                tokio::spawn(async move {
                    let _ = reply.send(worker.handle_fetch(&request).await);
                });
            }
            WorkerEvent::Sync { tag, reply } => {
                let worker = Arc::clone(&worker);
                tokio::spawn(async move {
                    let _ = reply.send(worker.handle_sync(&tag).await);
                });
            }
            WorkerEvent::Push { payload, reply } => {
                let _ = reply.send(Ok(worker.handle_push(payload.as_deref())));
            }
            WorkerEvent::NotificationClick { action, reply } => {
                let _ = reply.send(Ok(worker.handle_notification_click(action.as_deref())));
            }
        }
    }

    tracing::debug!(version = worker.version(), "worker dispatcher stopped");
}

/// Cloneable sender side of a [`Dispatcher`].
#[derive(Clone)]
pub struct DispatcherHandle {
    tx: mpsc::Sender<WorkerEvent>,
}

impl DispatcherHandle {
    async fn call<T>(&self, event: impl FnOnce(Reply<T>) -> WorkerEvent) -> Result<T, Error> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(event(reply)).await.map_err(|_| Error::WorkerClosed)?;
        rx.await.map_err(|_| Error::WorkerClosed)?
    }

    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.call(|reply| WorkerEvent::Install { reply }).await
    }

    pub async fn activate(&self) -> Result<EvictionReport, Error> {
        self.call(|reply| WorkerEvent::Activate { reply }).await
    }

    /// Register the worker: install, then activate.
    pub async fn start(&self) -> Result<(InstallReport, EvictionReport), Error> {
        let installed = self.install().await?;
        let evicted = self.activate().await?;
        Ok((installed, evicted))
    }

    pub async fn fetch(&self, request: Request) -> Result<Intercepted, Error> {
        self.call(|reply| WorkerEvent::Fetch { request, reply }).await
    }

    pub async fn sync(&self, tag: impl Into<String>) -> Result<Option<RefreshReport>, Error> {
        let tag = tag.into();
        self.call(|reply| WorkerEvent::Sync { tag, reply }).await
    }

    pub async fn push(&self, payload: Option<String>) -> Result<Notification, Error> {
        self.call(|reply| WorkerEvent::Push { payload, reply }).await
    }

    pub async fn notification_click(&self, action: Option<String>) -> Result<ClickOutcome, Error> {
        self.call(|reply| WorkerEvent::NotificationClick { action, reply }).await
    }

    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        self.call(|reply| WorkerEvent::Status { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::{FakeNetwork, caches, scope};
    use crate::worker::{SYNC_TAG, Served, WorkerState};
    use crate::fetch::Fetcher;
    use unmessify_core::AssetManifest;

    async fn dispatcher(network: &Arc<FakeNetwork>) -> (DispatcherHandle, JoinHandle<()>) {
        let fetcher: Arc<dyn Fetcher> = network.clone();
        let worker = Worker::new("v1", caches().await, fetcher, scope(), AssetManifest::standard());
        Dispatcher::spawn(Arc::new(worker), 8)
    }

    #[tokio::test]
    async fn test_start_then_serve_from_cache() {
        let network = FakeNetwork::serving(&AssetManifest::standard());
        let (handle, _task) = dispatcher(&network).await;

        let (installed, _) = handle.start().await.unwrap();
        assert_eq!(installed.cached.len(), 19);

        let calls = network.total_calls();
        let out = handle.fetch(Request::get(scope().resolve("/").unwrap())).await.unwrap();
        assert_eq!(out.served, Served::Cache);
        assert_eq!(network.total_calls(), calls);

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_queued_events_run_in_order() {
        let network = FakeNetwork::serving(&AssetManifest::standard());
        let (handle, _task) = dispatcher(&network).await;

        let install = handle.install();
        let activate = handle.activate();
        let (installed, activated) = tokio::join!(install, activate);

        assert!(installed.is_ok());
        assert!(activated.is_ok());
        assert_eq!(handle.status().await.unwrap().state, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_sync_after_start() {
        let network = FakeNetwork::serving(&AssetManifest::standard());
        let (handle, _task) = dispatcher(&network).await;
        handle.start().await.unwrap();

        let report = handle.sync(SYNC_TAG).await.unwrap().unwrap();
        assert_eq!(report.updated.len(), 12);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_push_and_click() {
        let network = FakeNetwork::new();
        let (handle, _task) = dispatcher(&network).await;

        let notification = handle.push(Some("Dinner menu changed".into())).await.unwrap();
        assert_eq!(notification.body, "Dinner menu changed");

        let outcome = handle.notification_click(Some("explore".into())).await.unwrap();
        assert_eq!(outcome, ClickOutcome::OpenWindow { url: "/".into() });
    }

    #[tokio::test]
    async fn test_closed_dispatcher() {
        let network = FakeNetwork::new();
        let (handle, task) = dispatcher(&network).await;
        task.abort();
        let _ = task.await;

        assert!(matches!(handle.status().await, Err(Error::WorkerClosed)));
    }
}
