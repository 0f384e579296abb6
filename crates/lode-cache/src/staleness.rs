use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum elapsed time between consecutive refresh attempts for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub ttl: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// Records when each logical version (and, once globally, the catalog) was
/// last checked for updates.
///
/// Stamps are taken *optimistically*: `begin_*` writes `now` before the
/// refresh runs, so concurrent callers inside the window see a fresh stamp
/// and skip their own refresh. A failed refresh hands its [`CheckToken`] back
/// via `roll_back`, restoring the pre-attempt value so the next call retries
/// instead of waiting out a full TTL.
///
/// This map has its own lock, separate from the dataset table's. The
/// composite "check staleness, then create if absent" sequence is therefore
/// not atomic; see the crate docs for the accepted race.
#[derive(Debug)]
pub(crate) struct StalenessTracker {
    ttl: Duration,
    catalog: Mutex<Option<Instant>>,
    versions: Mutex<HashMap<String, Instant>>,
}

/// Receipt for an in-flight refresh attempt.
#[derive(Debug)]
pub(crate) struct CheckToken {
    key: CheckKey,
    previous: Option<Instant>,
}

#[derive(Debug)]
enum CheckKey {
    Catalog,
    Version(String),
}

impl StalenessTracker {
    pub(crate) fn new(policy: RefreshPolicy) -> Self {
        Self {
            ttl: policy.ttl,
            catalog: Mutex::new(None),
            versions: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `version` has ever been checked (and not since cleared).
    pub(crate) fn has_checked(&self, version: &str) -> bool {
        self.versions.lock().contains_key(version)
    }

    /// Stamp `version` as checked now if a refresh is due; `None` means the
    /// previous check is still inside the TTL window.
    pub(crate) fn begin_version_check(&self, version: &str) -> Option<CheckToken> {
        let mut versions = self.versions.lock();
        let now = Instant::now();
        let previous = versions.get(version).copied();
        if let Some(last) = previous {
            if now.duration_since(last) < self.ttl {
                return None;
            }
        }
        versions.insert(version.to_owned(), now);
        Some(CheckToken {
            key: CheckKey::Version(version.to_owned()),
            previous,
        })
    }

    /// Same throttle rule as `begin_version_check`, for the global catalog
    /// stamp.
    pub(crate) fn begin_catalog_check(&self) -> Option<CheckToken> {
        let mut catalog = self.catalog.lock();
        let now = Instant::now();
        let previous = *catalog;
        if let Some(last) = previous {
            if now.duration_since(last) < self.ttl {
                return None;
            }
        }
        *catalog = Some(now);
        Some(CheckToken {
            key: CheckKey::Catalog,
            previous,
        })
    }

    /// Restore the stamp to its pre-attempt value after a failed refresh.
    pub(crate) fn roll_back(&self, token: CheckToken) {
        match token.key {
            CheckKey::Catalog => {
                *self.catalog.lock() = token.previous;
            }
            CheckKey::Version(version) => {
                let mut versions = self.versions.lock();
                match token.previous {
                    Some(previous) => {
                        versions.insert(version, previous);
                    }
                    None => {
                        versions.remove(&version);
                    }
                }
            }
        }
    }

    /// Drop the stamp for `version` so the next request is treated as
    /// first-ever (blocking refresh).
    pub(crate) fn clear(&self, version: &str) {
        self.versions.lock().remove(version);
    }
}
