use async_trait::async_trait;
use strand_types::SequenceHash;

use crate::error::StoreResult;

/// Content-addressed sequence storage.
///
/// All implementations must satisfy these invariants:
/// - A sequence is immutable once written. Writing a hash that is already
///   present is a successful no-op; the existing bytes are never replaced.
/// - Concurrent `put`s of the same hash are safe and leave exactly one copy.
/// - Readers never observe a partially written sequence.
/// - Sequences are not version-controlled and never touch a project
///   repository.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Check whether a sequence is stored under `hash`.
    async fn exists(&self, hash: &SequenceHash) -> StoreResult<bool>;

    /// Read a sequence. Fails with `SequenceNotFound` if absent.
    async fn get(&self, hash: &SequenceHash) -> StoreResult<String>;

    /// Store a sequence under `hash`. Idempotent.
    async fn put(&self, hash: &SequenceHash, sequence: &str) -> StoreResult<()>;

    /// Remove a sequence. Fails with `SequenceNotFound` if absent.
    async fn delete(&self, hash: &SequenceHash) -> StoreResult<()>;
}
