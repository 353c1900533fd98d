//! Install phase: populate the version's store from the asset manifest.

use std::sync::Arc;

use serde::Serialize;
use unmessify_core::{AssetManifest, CacheStore};

use super::batch::{PathFailure, fetch_into};
use crate::fetch::{Fetcher, Scope};

/// What an install stored and what it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub failed: Vec<PathFailure>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch every manifest entry into `store`.
///
/// Failures are logged and reported; a partial cache is still a successful
/// install.
pub async fn populate(
    store: &CacheStore, fetcher: &Arc<dyn Fetcher>, scope: &Scope, manifest: &AssetManifest,
) -> InstallReport {
    let outcome = fetch_into(store, fetcher, scope, manifest.entries()).await;

    for failure in &outcome.failed {
        tracing::warn!(store = store.name(), path = %failure.path, reason = %failure.reason, "cache install skipped entry");
    }
    tracing::info!(
        store = store.name(),
        cached = outcome.stored.len(),
        failed = outcome.failed.len(),
        "opened cache and installed manifest"
    );

    InstallReport { cached: outcome.stored, failed: outcome.failed }
}
