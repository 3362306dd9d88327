use std::fmt;
use std::path::PathBuf;

use strand_store::paths::{block_manifest_relative, project_manifest_relative};
use strand_store::PathResolver;
use strand_types::{BlockId, ProjectId};

/// The two kinds of manifest the store persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Block,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => f.write_str("project"),
            Self::Block => f.write_str("block"),
        }
    }
}

/// Address of one manifest. A block is always addressed through the
/// project that owns it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    Project(ProjectId),
    Block { project: ProjectId, block: BlockId },
}

impl Entity {
    pub fn project(project: ProjectId) -> Self {
        Self::Project(project)
    }

    pub fn block(project: ProjectId, block: BlockId) -> Self {
        Self::Block { project, block }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Project(_) => EntityKind::Project,
            Self::Block { .. } => EntityKind::Block,
        }
    }

    /// The entity's own identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Project(project) => project.as_str(),
            Self::Block { block, .. } => block.as_str(),
        }
    }

    /// The project whose repository holds this entity.
    pub fn scope(&self) -> &ProjectId {
        match self {
            Self::Project(project) | Self::Block { project, .. } => project,
        }
    }

    pub fn dir(&self, paths: &PathResolver) -> PathBuf {
        match self {
            Self::Project(project) => paths.project_dir(project),
            Self::Block { project, block } => paths.block_dir(project, block),
        }
    }

    pub fn manifest_path(&self, paths: &PathResolver) -> PathBuf {
        match self {
            Self::Project(project) => paths.project_manifest(project),
            Self::Block { project, block } => paths.block_manifest(project, block),
        }
    }

    /// Manifest path relative to the owning project's repository root.
    pub fn manifest_relative(&self) -> PathBuf {
        match self {
            Self::Project(_) => project_manifest_relative(),
            Self::Block { block, .. } => block_manifest_relative(block),
        }
    }

    /// Whether `create`, `write` and `merge` record a commit.
    ///
    /// Block content is only versioned when the project is next committed.
    pub fn commits_on_write(&self) -> bool {
        matches!(self, Self::Project(_))
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(project) => write!(f, "project {project}"),
            Self::Block { project, block } => write!(f, "block {block} (project {project})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ids() -> (ProjectId, BlockId) {
        (ProjectId::parse("p1").unwrap(), BlockId::parse("b1").unwrap())
    }

    #[test]
    fn project_addressing() {
        let (p, _) = ids();
        let paths = PathResolver::new("/d", "/s");
        let e = Entity::project(p.clone());
        assert_eq!(e.kind(), EntityKind::Project);
        assert_eq!(e.id(), "p1");
        assert_eq!(e.scope(), &p);
        assert_eq!(e.dir(&paths), Path::new("/d/p1"));
        assert_eq!(e.manifest_path(&paths), Path::new("/d/p1/manifest.json"));
        assert_eq!(e.manifest_relative(), Path::new("manifest.json"));
        assert!(e.commits_on_write());
    }

    #[test]
    fn block_addressing() {
        let (p, b) = ids();
        let paths = PathResolver::new("/d", "/s");
        let e = Entity::block(p.clone(), b);
        assert_eq!(e.kind(), EntityKind::Block);
        assert_eq!(e.id(), "b1");
        assert_eq!(e.scope(), &p);
        assert_eq!(e.dir(&paths), Path::new("/d/p1/blocks/b1"));
        assert_eq!(
            e.manifest_relative(),
            Path::new("blocks").join("b1").join("manifest.json")
        );
        assert!(!e.commits_on_write());
    }

    #[test]
    fn display() {
        let (p, b) = ids();
        assert_eq!(Entity::project(p.clone()).to_string(), "project p1");
        assert_eq!(Entity::block(p, b).to_string(), "block b1 (project p1)");
    }
}
