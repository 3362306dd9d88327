use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strand_store::PathResolver;
use strand_vcs::GitAuthor;

use crate::error::{PersistError, PersistResult};

/// Configuration for a [`Store`](crate::Store).
///
/// Every component receives its paths from here at construction; nothing
/// reads a process-wide root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root of the per-project repositories.
    pub data_dir: PathBuf,
    /// Flat directory of content-addressed sequences.
    pub sequence_dir: PathBuf,
    /// Author and committer name on every commit.
    pub author_name: String,
    /// Author and committer email on every commit.
    pub author_email: String,
    /// Serialize mutations per project. When `false`, concurrent writers to
    /// one project race at the filesystem and repository level.
    pub serialize_writes: bool,
    /// Run the validator on `create` as well as on `write` and `merge`.
    pub validate_on_create: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::rooted("storage")
    }
}

impl StoreConfig {
    /// Configuration with both directories under one root.
    pub fn rooted(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let author = GitAuthor::default();
        Self {
            data_dir: root.join("data"),
            sequence_dir: root.join("sequences"),
            author_name: author.name,
            author_email: author.email,
            serialize_writes: true,
            validate_on_create: false,
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> PersistResult<Self> {
        toml::from_str(text).map_err(|e| PersistError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PersistResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PersistError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> PersistResult<String> {
        toml::to_string_pretty(self).map_err(|e| PersistError::Config(e.to_string()))
    }

    pub fn paths(&self) -> PathResolver {
        PathResolver::new(&self.data_dir, &self.sequence_dir)
    }

    pub fn author(&self) -> GitAuthor {
        GitAuthor {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
        }
    }
}
