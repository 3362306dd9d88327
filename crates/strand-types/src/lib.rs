//! Foundation types for strand.
//!
//! This crate provides the identifier, content-hash, revision, and manifest
//! types shared by every other strand crate.
//!
//! # Key Types
//!
//! - [`ProjectId`] / [`BlockId`] -- path-safe entity identifiers
//! - [`SequenceHash`] -- content-addressed key of an immutable sequence
//! - [`Revision`] -- opaque version-control revision identifier
//! - [`Commit`] -- one entry of a project's history
//! - [`Manifest`] -- the JSON document stored for a project or block

pub mod error;
pub mod identity;
pub mod manifest;
pub mod revision;
pub mod sequence;

pub use error::TypeError;
pub use identity::{BlockId, ProjectId};
pub use manifest::Manifest;
pub use revision::{Commit, Revision};
pub use sequence::SequenceHash;
