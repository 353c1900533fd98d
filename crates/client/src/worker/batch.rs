//! Concurrent fetch-and-store over a list of paths.
//!
//! Every path is dispatched at once; the batch settles when all of them
//! have. One failing path never cancels or aborts the others.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use unmessify_core::CacheStore;

use crate::fetch::{Fetcher, Request, Scope};

/// A path that could not be stored, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct PathFailure {
    pub path: String,
    pub reason: String,
}

/// Per-path results, in input order.
#[derive(Debug, Default)]
pub(crate) struct BatchOutcome {
    pub stored: Vec<String>,
    pub failed: Vec<PathFailure>,
}

/// Fetch each path and write every 2xx response into `store`.
pub(crate) async fn fetch_into<'a>(
    store: &CacheStore, fetcher: &Arc<dyn Fetcher>, scope: &Scope, paths: impl IntoIterator<Item = &'a str>,
) -> BatchOutcome {
    let mut join_set = JoinSet::new();

    for (index, path) in paths.into_iter().enumerate() {
        let path = path.to_string();
        let store = store.clone();
        let fetcher = Arc::clone(fetcher);
        let scope = scope.clone();

        join_set.spawn(async move {
            let result = fetch_one(&store, fetcher.as_ref(), &scope, &path).await;
            (index, path, result)
        });
    }

    let mut settled = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(item) => settled.push(item),
            Err(e) => tracing::error!(error = %e, "cache batch task did not complete"),
        }
    }
    settled.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BatchOutcome::default();
    for (_, path, result) in settled {
        match result {
            Ok(()) => outcome.stored.push(path),
            Err(reason) => outcome.failed.push(PathFailure { path, reason }),
        }
    }
    outcome
}

async fn fetch_one(store: &CacheStore, fetcher: &dyn Fetcher, scope: &Scope, path: &str) -> Result<(), String> {
    let url = scope.resolve(path).map_err(|e| e.to_string())?;
    let request = Request::get(url);

    let response = fetcher.fetch(&request).await.map_err(|e| e.to_string())?;
    if !response.is_ok() {
        return Err(format!("status {}", response.status.as_u16()));
    }

    store
        .put(&request.key(), &response.to_cached())
        .await
        .map_err(|e| e.to_string())
}
