use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::util::atomic_write;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// File name of the per-area schema marker: a plain integer recording the
/// on-disk format version of the area's contents.
pub const SCHEMA_MARKER_FILENAME: &str = ".schema-version";

/// Handle to one provider's dataset area under the shared data root.
///
/// `open` runs the schema guard before returning:
/// - the data root is swept once per process (stray files are deleted with a
///   warning, directories without a schema marker are deleted as orphaned)
/// - if the area's marker is missing, unparsable, or older than
///   `schema_version`, the area is deleted recursively and recreated empty
///   with the new marker
/// - if the marker is current or newer, the area's contents are untouched
///
/// Guard failures are fatal and are not retried; callers abort startup.
#[derive(Debug, Clone)]
pub struct Store {
    data_root: PathBuf,
    area_dir: PathBuf,
    schema_version: u32,
}

impl Store {
    pub fn open(config: &StoreConfig, area: &str, schema_version: u32) -> Result<Self> {
        let data_root = config.data_root();
        match std::fs::metadata(&data_root) {
            Ok(meta) if !meta.is_dir() => {
                return Err(StoreError::DataRootNotDirectory { path: data_root });
            }
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                std::fs::create_dir_all(&data_root)?;
            }
            Err(err) => return Err(err.into()),
        }

        sweep_once(&data_root)?;

        let area_dir = data_root.join(area);
        ensure_schema(&area_dir, schema_version)?;

        Ok(Self {
            data_root,
            area_dir,
            schema_version,
        })
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// The provider's dataset area. Exists and carries a current schema
    /// marker once `open` has returned.
    pub fn area_dir(&self) -> &Path {
        &self.area_dir
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// Sweep the data root at most once per process (per root path, so tests with
/// distinct roots each observe their own sweep).
fn sweep_once(data_root: &Path) -> Result<()> {
    static SWEPT: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    let swept = SWEPT.get_or_init(|| Mutex::new(HashSet::new()));

    let mut swept = swept
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if !swept.insert(data_root.to_path_buf()) {
        return Ok(());
    }
    sweep(data_root)
}

/// Delete every data root entry that is not a dataset area: stray files, and
/// directories that never received a schema marker (interrupted rebuilds,
/// leftovers from older layouts).
fn sweep(data_root: &Path) -> Result<()> {
    for entry in std::fs::read_dir(data_root)? {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type()?.is_dir() {
            tracing::warn!(
                target = "lode.store",
                path = %path.display(),
                "found unknown file in data root; deleting"
            );
            std::fs::remove_file(&path)?;
            continue;
        }

        let marker = path.join(SCHEMA_MARKER_FILENAME);
        if !marker.is_file() {
            tracing::info!(
                target = "lode.store",
                path = %path.display(),
                "deleting dataset area without a schema marker"
            );
            std::fs::remove_dir_all(&path)?;
        }
    }
    Ok(())
}

fn ensure_schema(area_dir: &Path, required: u32) -> Result<()> {
    let marker_path = area_dir.join(SCHEMA_MARKER_FILENAME);

    if let Some(current) = read_marker(&marker_path) {
        if current >= required {
            return Ok(());
        }
        tracing::info!(
            target = "lode.store",
            area = %area_dir.display(),
            current,
            required,
            "dataset area schema is outdated; rebuilding"
        );
    } else if area_dir.exists() {
        tracing::info!(
            target = "lode.store",
            area = %area_dir.display(),
            required,
            "dataset area has no readable schema marker; rebuilding"
        );
    } else {
        tracing::info!(
            target = "lode.store",
            area = %area_dir.display(),
            required,
            "creating new dataset area"
        );
    }

    if area_dir.exists() {
        std::fs::remove_dir_all(area_dir)?;
    }
    std::fs::create_dir_all(area_dir)?;
    atomic_write(&marker_path, required.to_string().as_bytes())?;
    Ok(())
}

/// Read the schema marker, returning `None` for missing or unparsable
/// markers. Both are treated as "outdated" by the guard; only genuinely
/// unexpected contents are worth logging.
fn read_marker(marker_path: &Path) -> Option<u32> {
    let text = match std::fs::read_to_string(marker_path) {
        Ok(text) => text,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(
                    target = "lode.store",
                    path = %marker_path.display(),
                    error = %err,
                    "failed to read schema marker"
                );
            }
            return None;
        }
    };

    let line = text.lines().next().unwrap_or("").trim();
    match line.parse::<u32>() {
        Ok(version) => Some(version),
        Err(err) => {
            tracing::error!(
                target = "lode.store",
                path = %marker_path.display(),
                error = %err,
                "invalid schema marker contents"
            );
            None
        }
    }
}
