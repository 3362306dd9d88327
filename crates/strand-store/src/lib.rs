//! Filesystem layer for strand.
//!
//! This crate holds everything below the persistence API that touches the
//! disk directly:
//!
//! - [`PathResolver`] -- pure mapping from identifiers to storage locations
//! - [`FileStore`] -- async read/write/mkdir/delete primitives
//! - [`SequenceStore`] -- content-addressed, write-once sequence blobs
//!
//! # Storage Backends
//!
//! All sequence backends implement the [`SequenceStore`] trait:
//!
//! - [`FsSequenceStore`] -- one file per hash in a flat directory
//! - [`InMemorySequenceStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Sequences are immutable once written; duplicate writes are no-ops.
//! 2. Files are written to a temp sibling and renamed into place.
//! 3. "Not found" is always distinguishable from other I/O failures.
//! 4. Nothing in this crate parses manifest content.

pub mod error;
pub mod fs;
pub mod memory;
pub mod paths;
pub mod sequence;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FileStore;
pub use memory::InMemorySequenceStore;
pub use paths::PathResolver;
pub use sequence::FsSequenceStore;
pub use traits::SequenceStore;
