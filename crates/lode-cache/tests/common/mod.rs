#![allow(dead_code)]

use async_trait::async_trait;
use lode_cache::{CacheError, Dataset, DatasetProvider, RefreshError, RefreshOutcome};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// An instrumented in-memory provider that records hook invocations so tests
/// can assert call counts and ordering.
pub struct ScriptedProvider {
    versions: Mutex<Vec<String>>,
    refresh_delay: Duration,
    outcome: Mutex<RefreshOutcome>,
    fail_next_refreshes: AtomicUsize,
    catalog_refresh_calls: AtomicUsize,
    version_refresh_calls: AtomicUsize,
    create_calls: AtomicUsize,
    events: Mutex<Vec<&'static str>>,
}

impl ScriptedProvider {
    pub fn new(versions: &[&str]) -> Arc<Self> {
        Self::with_refresh_delay(versions, Duration::ZERO)
    }

    /// Like `new`, but every version refresh sleeps for `delay` first, so
    /// tests can observe that callers actually waited for it.
    pub fn with_refresh_delay(versions: &[&str], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            versions: Mutex::new(versions.iter().map(|v| v.to_string()).collect()),
            refresh_delay: delay,
            outcome: Mutex::new(RefreshOutcome::Current),
            fail_next_refreshes: AtomicUsize::new(0),
            catalog_refresh_calls: AtomicUsize::new(0),
            version_refresh_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        })
    }

    /// Make the next `n` refresh hook invocations (catalog or version) fail.
    pub fn fail_next_refreshes(&self, n: usize) {
        self.fail_next_refreshes.store(n, Ordering::SeqCst);
    }

    /// Outcome reported by subsequent successful version refreshes.
    pub fn set_outcome(&self, outcome: RefreshOutcome) {
        *self.outcome.lock() = outcome;
    }

    pub fn set_versions(&self, versions: &[&str]) {
        *self.versions.lock() = versions.iter().map(|v| v.to_string()).collect();
    }

    pub fn catalog_refresh_calls(&self) -> usize {
        self.catalog_refresh_calls.load(Ordering::SeqCst)
    }

    pub fn version_refresh_calls(&self) -> usize {
        self.version_refresh_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    fn take_failure(&self) -> bool {
        self.fail_next_refreshes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DatasetProvider for ScriptedProvider {
    type Dataset = ScriptedDataset;

    async fn refresh_catalog(&self) -> Result<(), RefreshError> {
        self.catalog_refresh_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            self.events.lock().push("catalog-refresh:fail");
            return Err(RefreshError::new("scripted catalog failure"));
        }
        self.events.lock().push("catalog-refresh");
        Ok(())
    }

    async fn refresh_version(&self, _version: &str) -> Result<RefreshOutcome, RefreshError> {
        self.events.lock().push("refresh:start");
        self.version_refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        if self.take_failure() {
            self.events.lock().push("refresh:fail");
            return Err(RefreshError::new("scripted refresh failure"));
        }
        self.events.lock().push("refresh:done");
        Ok(*self.outcome.lock())
    }

    fn known_versions(&self) -> Vec<String> {
        self.versions.lock().clone()
    }

    fn latest_known_version(&self) -> Option<String> {
        self.versions.lock().last().cloned()
    }

    fn create_dataset(&self, version: &str) -> Result<ScriptedDataset, CacheError> {
        if !self.versions.lock().iter().any(|v| v == version) {
            return Err(CacheError::unknown_version(version));
        }
        self.events.lock().push("create");
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedDataset {
            version: version.to_owned(),
            loaded: false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Field,
    Method,
}

#[derive(Debug)]
pub struct ScriptedDataset {
    version: String,
    loaded: bool,
}

#[async_trait]
impl Dataset for ScriptedDataset {
    type Record = String;
    type Kind = RecordKind;

    async fn load(&mut self) -> Result<(), CacheError> {
        self.loaded = true;
        Ok(())
    }

    fn by_key(&self, key: &str) -> Vec<String> {
        assert!(self.loaded, "lookup before load");
        vec![format!("{}:{key}", self.version)]
    }

    fn by_kind_and_key(&self, kind: RecordKind, key: &str) -> Vec<String> {
        assert!(self.loaded, "lookup before load");
        vec![format!("{}:{kind:?}:{key}", self.version)]
    }
}

/// Give detached background work a chance to run to completion on the
/// current-thread test runtime.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
