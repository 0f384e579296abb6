pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors surfaced on the cache read path.
///
/// Refresh failures never appear here: they are logged and rolled back so the
/// next TTL window retries, and callers keep reading stale-but-available
/// data. See [`RefreshError`].
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The provider does not know the requested logical version. No cache
    /// entry is created for the version.
    #[error("unknown dataset version {version}")]
    UnknownVersion { version: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A provider-defined construction or load failure.
    #[error("dataset error: {0}")]
    Dataset(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl CacheError {
    pub fn unknown_version(version: impl Into<String>) -> Self {
        Self::UnknownVersion {
            version: version.into(),
        }
    }

    pub fn dataset(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Dataset(err.into())
    }
}

/// Error returned by collaborator refresh hooks.
///
/// The engine only ever logs these and rolls the staleness stamp back; the
/// payload is opaque so providers can carry whatever cause they have without
/// the engine depending on their error types.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RefreshError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl RefreshError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(err.into())
    }
}

impl From<std::io::Error> for RefreshError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}
