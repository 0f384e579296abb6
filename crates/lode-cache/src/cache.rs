use crate::catalog::VersionCatalog;
use crate::error::Result;
use crate::provider::{Dataset, DatasetKind, DatasetProvider, DatasetRecord, RefreshOutcome};
use crate::staleness::{CheckToken, RefreshPolicy, StalenessTracker};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps logical versions to loaded dataset handles, refreshing each version
/// through the provider on the configured TTL.
///
/// Cheap to clone; clones share the same table, staleness map, and provider.
/// Background refreshes are spawned onto the ambient tokio runtime, so all
/// operations must run inside one.
pub struct DatasetCache<P: DatasetProvider> {
    inner: Arc<CacheInner<P>>,
    catalog: VersionCatalog<P>,
}

impl<P: DatasetProvider> Clone for DatasetCache<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            catalog: self.catalog.clone(),
        }
    }
}

struct CacheInner<P: DatasetProvider> {
    provider: Arc<P>,
    staleness: Arc<StalenessTracker>,
    datasets: Mutex<HashMap<String, Arc<P::Dataset>>>,
}

impl<P: DatasetProvider> DatasetCache<P> {
    pub fn new(provider: Arc<P>, policy: RefreshPolicy) -> Self {
        let staleness = Arc::new(StalenessTracker::new(policy));
        let catalog = VersionCatalog::new(Arc::clone(&provider), Arc::clone(&staleness));
        Self {
            inner: Arc::new(CacheInner {
                provider,
                staleness,
                datasets: Mutex::new(HashMap::new()),
            }),
            catalog,
        }
    }

    /// The catalog sharing this cache's provider and staleness discipline.
    pub fn catalog(&self) -> &VersionCatalog<P> {
        &self.catalog
    }

    /// See [`VersionCatalog::list_versions`].
    pub async fn list_versions(&self) -> Vec<String> {
        self.catalog.list_versions().await
    }

    /// See [`VersionCatalog::latest_version`].
    pub async fn latest_version(&self) -> Option<String> {
        self.catalog.latest_version().await
    }

    /// The loaded dataset for `version`, building it on first use.
    ///
    /// The first request ever made for a version awaits a refresh before
    /// touching the dataset, so cold starts never read files the provider
    /// has not finished writing. Refreshes after that run detached: the
    /// caller gets the cached handle immediately and the refresh lands on
    /// its own, evicting the handle if it replaced the on-disk data. Served
    /// data may therefore be stale by at most one TTL.
    ///
    /// Fails with [`CacheError::UnknownVersion`](crate::CacheError) when the
    /// provider rejects the version; nothing is cached in that case.
    pub async fn get_dataset(&self, version: &str) -> Result<Arc<P::Dataset>> {
        let first = !self.inner.staleness.has_checked(version);
        if let Some(token) = self.inner.staleness.begin_version_check(version) {
            if first {
                self.inner.run_version_refresh(version, token).await;
            } else {
                let inner = Arc::clone(&self.inner);
                let version = version.to_owned();
                tokio::spawn(async move {
                    inner.run_version_refresh(&version, token).await;
                });
            }
        }

        if let Some(existing) = self.inner.datasets.lock().get(version) {
            return Ok(Arc::clone(existing));
        }

        let mut dataset = self.inner.provider.create_dataset(version)?;
        dataset.load().await?;
        let handle = Arc::new(dataset);
        // Two racing builders for one version both land here; the table
        // keeps whichever insert wins, and the loser's handle just drops
        // when its callers are done with it.
        self.inner
            .datasets
            .lock()
            .insert(version.to_owned(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Drop the staleness record for `version`, so the next
    /// [`get_dataset`](Self::get_dataset) call behaves as a first-ever
    /// (blocking) request regardless of remaining TTL.
    pub fn force_update_check(&self, version: &str) {
        self.inner.staleness.clear(version);
    }

    /// Evict the cached handle for `version`, leaving the staleness record
    /// untouched. The next request rebuilds the dataset from current on-disk
    /// data without forcing a fresh check.
    pub fn remove(&self, version: &str) {
        self.inner.datasets.lock().remove(version);
    }

    /// All records matching `key` in the dataset for `version`.
    pub async fn lookup(&self, key: &str, version: &str) -> Result<Vec<DatasetRecord<P>>> {
        let dataset = self.get_dataset(version).await?;
        Ok(dataset.by_key(key))
    }

    /// All records of `kind` matching `key` in the dataset for `version`.
    pub async fn lookup_by_kind(
        &self,
        kind: DatasetKind<P>,
        key: &str,
        version: &str,
    ) -> Result<Vec<DatasetRecord<P>>> {
        let dataset = self.get_dataset(version).await?;
        Ok(dataset.by_kind_and_key(kind, key))
    }
}

impl<P: DatasetProvider> CacheInner<P> {
    async fn run_version_refresh(&self, version: &str, token: CheckToken) {
        match self.provider.refresh_version(version).await {
            Ok(RefreshOutcome::Current) => {}
            Ok(RefreshOutcome::Updated) => {
                tracing::debug!(
                    target = "lode.cache",
                    version,
                    "refresh replaced on-disk data; evicting cached dataset"
                );
                self.datasets.lock().remove(version);
            }
            Err(err) => {
                tracing::warn!(
                    target = "lode.cache",
                    version,
                    error = %err,
                    "version refresh failed; serving cached data and retrying on the next call"
                );
                self.staleness.roll_back(token);
            }
        }
    }
}
