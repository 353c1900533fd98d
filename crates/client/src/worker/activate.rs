//! Activate phase: evict every store left behind by earlier versions.

use unmessify_core::{Caches, EvictionReport};

/// Delete all stores except `version`, then make sure `version` exists.
///
/// Never fails: enumeration and per-store errors are logged and the caller
/// proceeds with whatever was evicted.
pub async fn evict_stale(caches: &Caches, version: &str) -> EvictionReport {
    let report = match caches.delete_stores_except(version).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(version, error = %e, "could not enumerate caches for eviction");
            EvictionReport::default()
        }
    };

    if let Err(e) = caches.open(version).await {
        tracing::warn!(version, error = %e, "could not open current cache after eviction");
    }

    tracing::info!(version, deleted = report.deleted.len(), failed = report.failed.len(), "cache eviction finished");
    report
}
