//! On-disk storage area management for versioned dataset providers.
//!
//! Each dataset provider owns one *area* (a subdirectory) under a shared data
//! root. An area holds an otherwise opaque, provider-defined set of
//! version-specific files, plus a single schema marker recording the on-disk
//! format version of the area's contents.
//!
//! ## On-disk layout
//!
//! Areas live under `<data_root>/<area>/`:
//! - `.schema-version`:
//!   - plain integer text file, see [`SCHEMA_MARKER_FILENAME`]
//! - everything else:
//!   - provider-defined version-specific files; this crate never inspects them
//!
//! Opening a [`Store`] runs the schema guard for its area: the data root is
//! swept once per process (stray files and markerless directories are
//! removed), and an area whose marker is older than the required schema
//! version is wiped and recreated before any dataset is loaded from it.

mod config;
mod error;
mod schema;
mod util;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use schema::{Store, SCHEMA_MARKER_FILENAME};
pub use util::atomic_write;
