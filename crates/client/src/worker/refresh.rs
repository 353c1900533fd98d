//! Background refresh of the data documents.

use std::sync::Arc;

use serde::Serialize;
use unmessify_core::{AssetManifest, CacheStore};

use super::batch::{PathFailure, fetch_into};
use crate::fetch::{Fetcher, Scope};

/// Sync tag that triggers a refresh. Other tags are ignored.
pub const SYNC_TAG: &str = "background-sync";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct RefreshReport {
    pub updated: Vec<String>,
    pub failed: Vec<PathFailure>,
}

/// Re-fetch every data document and overwrite its entry.
///
/// A document that fails keeps whatever entry it had.
pub async fn refresh(
    store: &CacheStore, fetcher: &Arc<dyn Fetcher>, scope: &Scope, manifest: &AssetManifest,
) -> RefreshReport {
    let outcome = fetch_into(store, fetcher, scope, manifest.data_paths()).await;

    for failure in &outcome.failed {
        tracing::warn!(path = %failure.path, reason = %failure.reason, "failed to refresh data document");
    }
    tracing::info!(updated = outcome.stored.len(), failed = outcome.failed.len(), "background refresh finished");

    RefreshReport { updated: outcome.stored, failed: outcome.failed }
}
