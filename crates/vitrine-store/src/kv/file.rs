//! File-backed key-value backend.
//!
//! One file per key: `<dir>/<key>.json`. Writes go to a sibling temp file
//! first and are renamed into place, so a crash mid-write leaves the
//! previous record intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use super::{validate_key, KeyValueStore};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Uses `dir` as the storage root. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Uses the platform data directory.
    ///
    /// - **Linux**: `~/.local/share/vitrine/`
    /// - **macOS**: `~/Library/Application Support/shop.vitrine.vitrine/`
    /// - **Windows**: `%APPDATA%\vitrine\vitrine\data\`
    pub fn in_default_location() -> StoreResult<Self> {
        Self::default_dir()
            .map(Self::new)
            .ok_or(StoreError::NoDataDirectory)
    }

    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("shop", "vitrine", "vitrine").map(|dirs| dirs.data_dir().to_path_buf())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        debug!(?path, bytes = value.len(), "wrote key");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(?path, "removed key");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
