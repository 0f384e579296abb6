use crate::error::{CacheError, RefreshError};
use async_trait::async_trait;

/// Record type served by a provider's datasets.
pub type DatasetRecord<P> = <<P as DatasetProvider>::Dataset as Dataset>::Record;

/// Record kind used by a provider's typed lookups.
pub type DatasetKind<P> = <<P as DatasetProvider>::Dataset as Dataset>::Kind;

/// Outcome of a per-version refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// On-disk data was already up to date.
    Current,
    /// On-disk data was replaced; any previously loaded in-memory dataset
    /// for the version is now stale and gets evicted by the cache.
    Updated,
}

/// A loaded, queryable dataset for one logical version.
///
/// The cache treats datasets as opaque: records, kinds, and match ordering
/// are whatever the provider defines.
#[async_trait]
pub trait Dataset: Send + Sync + 'static {
    type Record: Send;
    type Kind: Send;

    /// Load the dataset's contents from its backing storage.
    ///
    /// Invoked exactly once by the cache, immediately after construction and
    /// before the handle becomes visible to any caller.
    async fn load(&mut self) -> Result<(), CacheError>;

    /// All records matching `key`, in dataset-defined order.
    fn by_key(&self, key: &str) -> Vec<Self::Record>;

    /// All records of `kind` matching `key`, in dataset-defined order.
    fn by_kind_and_key(&self, kind: Self::Kind, key: &str) -> Vec<Self::Record>;
}

/// Capability set implemented once per dataset provider.
///
/// The cache depends only on this trait, never on a concrete provider type.
/// Both refresh hooks must be idempotent: they may run repeatedly (including
/// concurrently with reads) and their failures must not corrupt previously
/// known state.
#[async_trait]
pub trait DatasetProvider: Send + Sync + 'static {
    type Dataset: Dataset;

    /// Bring the in-memory version catalog up to date.
    async fn refresh_catalog(&self) -> Result<(), RefreshError>;

    /// Bring on-disk data for `version` up to date. A no-op returning
    /// [`RefreshOutcome::Current`] when nothing changed upstream.
    async fn refresh_version(&self, version: &str) -> Result<RefreshOutcome, RefreshError>;

    /// Snapshot of the catalog's last successfully refreshed version list.
    /// Synchronous and non-blocking.
    fn known_versions(&self) -> Vec<String>;

    /// Latest entry of the last successfully refreshed catalog.
    fn latest_known_version(&self) -> Option<String>;

    /// Construct (but do not load) a dataset for `version`, or fail with
    /// [`CacheError::UnknownVersion`] for unknown or unsupported keys.
    fn create_dataset(&self, version: &str) -> Result<Self::Dataset, CacheError>;
}
