use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use strand_types::SequenceHash;

use crate::error::{StoreError, StoreResult};
use crate::traits::SequenceStore;

/// In-memory, HashMap-based sequence store.
///
/// Intended for tests and embedding. Sequences are held behind a `RwLock`
/// and cloned on read.
pub struct InMemorySequenceStore {
    sequences: RwLock<HashMap<SequenceHash, String>>,
}

impl InMemorySequenceStore {
    pub fn new() -> Self {
        Self {
            sequences: RwLock::new(HashMap::new()),
        }
    }

    /// Number of sequences currently stored.
    pub fn len(&self) -> usize {
        self.sequences.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored sequences.
    pub fn total_bytes(&self) -> usize {
        self.sequences
            .read()
            .expect("lock poisoned")
            .values()
            .map(String::len)
            .sum()
    }
}

impl Default for InMemorySequenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SequenceStore for InMemorySequenceStore {
    async fn exists(&self, hash: &SequenceHash) -> StoreResult<bool> {
        Ok(self.sequences.read().expect("lock poisoned").contains_key(hash))
    }

    async fn get(&self, hash: &SequenceHash) -> StoreResult<String> {
        self.sequences
            .read()
            .expect("lock poisoned")
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::SequenceNotFound(hash.clone()))
    }

    async fn put(&self, hash: &SequenceHash, sequence: &str) -> StoreResult<()> {
        let mut map = self.sequences.write().expect("lock poisoned");
        // First write wins; the hash names the content.
        map.entry(hash.clone())
            .or_insert_with(|| sequence.to_string());
        Ok(())
    }

    async fn delete(&self, hash: &SequenceHash) -> StoreResult<()> {
        let mut map = self.sequences.write().expect("lock poisoned");
        map.remove(hash)
            .map(|_| ())
            .ok_or_else(|| StoreError::SequenceNotFound(hash.clone()))
    }
}

impl std::fmt::Debug for InMemorySequenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySequenceStore")
            .field("sequence_count", &self.len())
            .finish()
    }
}
