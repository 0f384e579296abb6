use crate::provider::DatasetProvider;
use crate::staleness::StalenessTracker;
use std::sync::Arc;

/// In-memory view of the known logical versions, refreshed through the
/// provider on the shared TTL.
///
/// Both reads first ensure the catalog is fresh: a stale catalog stamp makes
/// the call await `refresh_catalog` synchronously before answering. There is
/// no forced-refresh variant for the catalog; only per-version force exists
/// on [`DatasetCache`](crate::DatasetCache).
pub struct VersionCatalog<P: DatasetProvider> {
    provider: Arc<P>,
    staleness: Arc<StalenessTracker>,
}

impl<P: DatasetProvider> Clone for VersionCatalog<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            staleness: Arc::clone(&self.staleness),
        }
    }
}

impl<P: DatasetProvider> VersionCatalog<P> {
    pub(crate) fn new(provider: Arc<P>, staleness: Arc<StalenessTracker>) -> Self {
        Self {
            provider,
            staleness,
        }
    }

    /// The known logical versions, from the provider's last successfully
    /// refreshed state.
    pub async fn list_versions(&self) -> Vec<String> {
        self.refresh_if_stale().await;
        self.provider.known_versions()
    }

    /// The latest known logical version, under the same throttle rule as
    /// [`list_versions`](Self::list_versions).
    pub async fn latest_version(&self) -> Option<String> {
        self.refresh_if_stale().await;
        self.provider.latest_known_version()
    }

    async fn refresh_if_stale(&self) {
        let Some(token) = self.staleness.begin_catalog_check() else {
            return;
        };
        if let Err(err) = self.provider.refresh_catalog().await {
            tracing::warn!(
                target = "lode.cache",
                error = %err,
                "catalog refresh failed; serving last known versions and retrying on the next call"
            );
            self.staleness.roll_back(token);
        }
    }
}
