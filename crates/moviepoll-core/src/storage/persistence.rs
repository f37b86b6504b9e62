//! JSON file persistence
//!
//! Saves and loads the whole store snapshot as a single JSON document.
//! Uses atomic writes (write to temp file, then rename) so a crash mid-save
//! leaves the previous file intact.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageResult};
use super::schema::Snapshot;

/// Persistence layer for the store snapshot
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    /// Create a persistence handler for the data file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the data file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Serialize and atomically write a snapshot
    pub fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(StorageError::Encode)?;
        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} bytes to {:?}", bytes.len(), self.path);
        Ok(())
    }

    /// Load the snapshot from disk
    ///
    /// Returns `None` if the data file doesn't exist.
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(&self) -> StorageResult<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(|e| StorageError::from_read(e, self.path.clone()))?;

        let snapshot =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::InvalidFormat {
                path: self.path.clone(),
                details: e.to_string(),
            })?;

        debug!("Loaded data file {:?}", self.path);
        Ok(Some(snapshot))
    }

    /// Load the existing snapshot or create and save a fresh one
    pub fn load_or_create(&self) -> StorageResult<Snapshot> {
        if let Some(snapshot) = self.load()? {
            return Ok(snapshot);
        }

        let snapshot = Snapshot::new();
        self.save(&snapshot)?;
        Ok(snapshot)
    }

    /// Delete the data file
    ///
    /// Use with caution!
    pub fn delete(&self) -> StorageResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| StorageError::from_write(e, self.path.clone()))?;
        }
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let temp_path = temp_path_for(path);

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_write(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Sibling of `path` with `.tmp` appended to the full file name
///
/// Same directory, so the rename cannot cross filesystems. Never equal to
/// `path`, whatever its extension.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
