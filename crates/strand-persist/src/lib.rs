//! Manifest persistence for strand.
//!
//! [`Store`] is the single entry point: it keeps project and block
//! manifests on disk, gives every project its own revision history, and
//! stores sequences once by content hash.
//!
//! # Example
//!
//! ```no_run
//! use strand_persist::{Store, StoreConfig};
//! use strand_types::{BlockId, Manifest, ProjectId};
//!
//! # async fn demo() -> strand_persist::PersistResult<()> {
//! let store = Store::new(StoreConfig::rooted("./storage"));
//! let project = ProjectId::generate();
//! store.project_create(&project, Manifest::new(project.as_str())).await?;
//!
//! let block = BlockId::generate();
//! let mut manifest = Manifest::new(block.as_str());
//! manifest.set_sequence_hash(&store.sequence_put("ACGT").await?);
//! store.block_create(&project, &block, manifest).await?;
//! store.save(&project, Some("add first block")).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod locks;
pub mod merge;
pub mod store;
pub mod validation;

pub use config::StoreConfig;
pub use entity::{Entity, EntityKind};
pub use error::{ErrorKind, PersistError, PersistResult};
pub use merge::{deep_merge, merge_manifest};
pub use store::{Store, DEFAULT_SAVE_MESSAGE};
pub use validation::{ManifestValidator, PermissiveValidator, SchemaValidator};
