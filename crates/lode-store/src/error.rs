use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced by storage-area management.
///
/// Any of these is fatal to startup: the schema guard is not retried, and no
/// dataset may be loaded from an area whose guard failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data root {path} exists but is not a directory")]
    DataRootNotDirectory { path: PathBuf },
}
