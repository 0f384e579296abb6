//! Versioned dataset cache with throttled asynchronous refresh.
//!
//! The engine maps a *logical version* (an opaque string key such as a
//! target-platform release label) to a loaded, queryable dataset, and keeps
//! that dataset fresh on a fixed TTL without serializing callers behind a
//! global lock:
//!
//! - the first request ever made for a version blocks until a refresh has
//!   completed, so cold starts never observe missing or stale on-disk data
//! - later requests inside the TTL window are served straight from memory
//! - requests past the TTL boundary are still served from memory, but detach
//!   a background refresh whose outcome can evict the cached dataset
//!
//! All dataset knowledge lives behind the [`DatasetProvider`] capability set:
//! the provider refreshes a version catalog and per-version on-disk data, and
//! constructs [`Dataset`] values the cache loads exactly once and then shares
//! as `Arc` handles. The engine never parses dataset contents and never
//! performs network fetches itself.
//!
//! The cache table and the staleness map are guarded by separate locks, so
//! "check staleness, then create if absent" is not atomic as a whole: two
//! first-ever requests for one version may both refresh and both construct,
//! with the table keeping whichever handle lands last. That at-least-once
//! construction policy is deliberate; see `DESIGN.md`.

mod cache;
mod catalog;
mod error;
mod provider;
mod staleness;

pub use cache::DatasetCache;
pub use catalog::VersionCatalog;
pub use error::{CacheError, RefreshError, Result};
pub use provider::{Dataset, DatasetKind, DatasetProvider, DatasetRecord, RefreshOutcome};
pub use staleness::RefreshPolicy;
