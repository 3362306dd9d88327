//! Canonical storage locations.
//!
//! ```text
//! <data_dir>/<P>/                        one repository per project
//! <data_dir>/<P>/manifest.json           project manifest
//! <data_dir>/<P>/blocks/<B>/manifest.json
//! <sequence_dir>/<H>                     flat, project-agnostic
//! ```
//!
//! Every function here is pure: no I/O, no failure. Historical content is
//! read through the version-control backend using the *relative* paths,
//! never through alternate locations on disk.

use std::path::{Path, PathBuf};

use strand_types::{BlockId, ProjectId, SequenceHash};

/// File name of every manifest document.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Directory under a project root that holds block directories.
pub const BLOCKS_DIR: &str = "blocks";

/// Maps identifiers to paths under the configured roots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResolver {
    data_dir: PathBuf,
    sequence_dir: PathBuf,
}

impl PathResolver {
    pub fn new(data_dir: impl Into<PathBuf>, sequence_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sequence_dir: sequence_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sequence_dir(&self) -> &Path {
        &self.sequence_dir
    }

    /// Root directory (and repository) of a project.
    pub fn project_dir(&self, project: &ProjectId) -> PathBuf {
        self.data_dir.join(project.as_str())
    }

    pub fn project_manifest(&self, project: &ProjectId) -> PathBuf {
        self.project_dir(project).join(MANIFEST_FILE)
    }

    pub fn block_dir(&self, project: &ProjectId, block: &BlockId) -> PathBuf {
        self.project_dir(project).join(block_dir_relative(block))
    }

    pub fn block_manifest(&self, project: &ProjectId, block: &BlockId) -> PathBuf {
        self.project_dir(project).join(block_manifest_relative(block))
    }

    /// Location of a sequence blob. Independent of any project.
    pub fn sequence(&self, hash: &SequenceHash) -> PathBuf {
        self.sequence_dir.join(hash.as_str())
    }
}

/// Project manifest path relative to the project repository root.
pub fn project_manifest_relative() -> PathBuf {
    PathBuf::from(MANIFEST_FILE)
}

/// Block directory relative to the project repository root.
pub fn block_dir_relative(block: &BlockId) -> PathBuf {
    Path::new(BLOCKS_DIR).join(block.as_str())
}

/// Block manifest path relative to the project repository root.
pub fn block_manifest_relative(block: &BlockId) -> PathBuf {
    block_dir_relative(block).join(MANIFEST_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/data", "/sequences")
    }

    #[test]
    fn project_paths() {
        let p = ProjectId::parse("P1").unwrap();
        assert_eq!(resolver().project_dir(&p), PathBuf::from("/data/P1"));
        assert_eq!(
            resolver().project_manifest(&p),
            PathBuf::from("/data/P1/manifest.json")
        );
    }

    #[test]
    fn block_paths_nest_under_project() {
        let p = ProjectId::parse("P1").unwrap();
        let b = BlockId::parse("B1").unwrap();
        assert_eq!(resolver().block_dir(&p, &b), PathBuf::from("/data/P1/blocks/B1"));
        assert_eq!(
            resolver().block_manifest(&p, &b),
            PathBuf::from("/data/P1/blocks/B1/manifest.json")
        );
        assert!(resolver()
            .block_manifest(&p, &b)
            .starts_with(resolver().project_dir(&p)));
    }

    #[test]
    fn relative_paths_match_absolute() {
        let p = ProjectId::parse("P1").unwrap();
        let b = BlockId::parse("B1").unwrap();
        let r = resolver();
        assert_eq!(
            r.project_dir(&p).join(block_manifest_relative(&b)),
            r.block_manifest(&p, &b)
        );
        assert_eq!(
            r.project_dir(&p).join(project_manifest_relative()),
            r.project_manifest(&p)
        );
    }

    #[test]
    fn sequences_are_project_agnostic() {
        let h = SequenceHash::parse("abcd").unwrap();
        assert_eq!(resolver().sequence(&h), PathBuf::from("/sequences/abcd"));
    }
}
