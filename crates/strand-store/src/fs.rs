//! Raw file and directory primitives.
//!
//! These wrappers never parse or validate content. Every failure carries the
//! path it happened at, and "not found" is always reported as
//! [`StoreError::NotFound`] so callers can branch on presence.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Async filesystem primitives used by the sequence store and the
/// persistence layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileStore;

impl FileStore {
    pub fn new() -> Self {
        Self
    }

    /// Returns `Ok(false)` if nothing exists at `path`; other failures
    /// (permissions, I/O) are errors.
    pub async fn exists(&self, path: &Path) -> StoreResult<bool> {
        match fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) => match StoreError::from_io(path, e) {
                StoreError::NotFound { .. } => Ok(false),
                other => Err(other),
            },
        }
    }

    pub async fn read(&self, path: &Path) -> StoreResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| StoreError::from_io(path, e))
    }

    pub async fn read_to_string(&self, path: &Path) -> StoreResult<String> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|_| StoreError::NotUtf8 {
            path: path.to_path_buf(),
        })
    }

    /// Write `contents` to `path` atomically.
    ///
    /// The data goes to a uniquely named sibling first and is then renamed
    /// over the target, so a concurrent reader sees either the old file or
    /// the complete new one, never a truncated one. The parent directory
    /// must already exist.
    pub async fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> StoreResult<()> {
        let tmp = temp_sibling(path);
        if let Err(e) = fs::write(&tmp, contents.as_ref()).await {
            return Err(StoreError::from_io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, path).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(StoreError::from_io(path, e));
        }
        debug!(path = %path.display(), "wrote file");
        Ok(())
    }

    /// Create `path` and all missing parents. Succeeds if it already exists.
    pub async fn mkdir_all(&self, path: &Path) -> StoreResult<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| StoreError::from_io(path, e))
    }

    pub async fn delete_file(&self, path: &Path) -> StoreResult<()> {
        fs::remove_file(path)
            .await
            .map_err(|e| StoreError::from_io(path, e))
    }

    pub async fn delete_dir_all(&self, path: &Path) -> StoreResult<()> {
        fs::remove_dir_all(path)
            .await
            .map_err(|e| StoreError::from_io(path, e))
    }

    /// Names of the immediate subdirectories of `path`, sorted.
    ///
    /// A missing `path` yields an empty list.
    pub async fn list_dirs(&self, path: &Path) -> StoreResult<Vec<String>> {
        let mut entries = match fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) => {
                return match StoreError::from_io(path, e) {
                    StoreError::NotFound { .. } => Ok(Vec::new()),
                    other => Err(other),
                }
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::from_io(path, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StoreError::from_io(&entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".tmp-{}", uuid::Uuid::now_v7().simple()));
    path.with_file_name(name)
}
