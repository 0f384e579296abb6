use std::path::PathBuf;

/// Configuration for selecting the on-disk data root.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    /// Override the shared data root directory (provider areas are still
    /// appended underneath it).
    pub data_root_override: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            data_root_override: std::env::var_os("LODE_DATA_DIR").map(PathBuf::from),
        }
    }

    pub(crate) fn data_root(&self) -> PathBuf {
        match &self.data_root_override {
            Some(root) => root.clone(),
            None => PathBuf::from("data"),
        }
    }
}
