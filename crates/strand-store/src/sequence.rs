use std::path::Path;

use async_trait::async_trait;
use strand_types::SequenceHash;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::fs::FileStore;
use crate::paths::PathResolver;
use crate::traits::SequenceStore;

/// Sequence store backed by a flat directory, one file per hash.
#[derive(Clone, Debug)]
pub struct FsSequenceStore {
    paths: PathResolver,
    files: FileStore,
}

impl FsSequenceStore {
    pub fn new(paths: PathResolver) -> Self {
        Self {
            paths,
            files: FileStore::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.paths.sequence_dir()
    }

    fn not_found(hash: &SequenceHash, err: StoreError) -> StoreError {
        if err.is_not_found() {
            StoreError::SequenceNotFound(hash.clone())
        } else {
            err
        }
    }
}

#[async_trait]
impl SequenceStore for FsSequenceStore {
    async fn exists(&self, hash: &SequenceHash) -> StoreResult<bool> {
        self.files.exists(&self.paths.sequence(hash)).await
    }

    async fn get(&self, hash: &SequenceHash) -> StoreResult<String> {
        self.files
            .read_to_string(&self.paths.sequence(hash))
            .await
            .map_err(|e| Self::not_found(hash, e))
    }

    async fn put(&self, hash: &SequenceHash, sequence: &str) -> StoreResult<()> {
        let path = self.paths.sequence(hash);
        if self.files.exists(&path).await? {
            debug!(%hash, "sequence already stored");
            return Ok(());
        }
        self.files.mkdir_all(self.root()).await?;
        // Two writers can both get past the check above. Each renames a
        // private temp file into place, and the bytes are identical, so the
        // loser's rename is harmless.
        self.files.write(&path, sequence).await?;
        debug!(%hash, len = sequence.len(), "stored sequence");
        Ok(())
    }

    async fn delete(&self, hash: &SequenceHash) -> StoreResult<()> {
        self.files
            .delete_file(&self.paths.sequence(hash))
            .await
            .map_err(|e| Self::not_found(hash, e))?;
        debug!(%hash, "deleted sequence");
        Ok(())
    }
}
