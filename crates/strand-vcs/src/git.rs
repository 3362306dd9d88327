//! Git-backed [`VersionControl`] implementation.
//!
//! libgit2 is synchronous, so every call runs on tokio's blocking pool and
//! reopens the repository from its path. Nothing is cached between calls.

use std::path::Path;

use async_trait::async_trait;
use chrono::DateTime;
use git2::{ErrorCode, IndexAddOption, IndexMatchedPath, Repository, Signature, Sort};
use strand_types::{Commit, Revision};
use tracing::{debug, info};

use crate::error::{Result, VcsError};
use crate::traits::VersionControl;

/// Identity recorded as author and committer of every commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for GitAuthor {
    fn default() -> Self {
        Self {
            name: "strand".into(),
            email: "strand@localhost".into(),
        }
    }
}

/// Version control backed by one git repository per directory.
#[derive(Clone, Debug, Default)]
pub struct GitBackend {
    author: GitAuthor,
}

impl GitBackend {
    pub fn new(author: GitAuthor) -> Self {
        Self { author }
    }

    pub fn author(&self) -> &GitAuthor {
        &self.author
    }
}

#[async_trait]
impl VersionControl for GitBackend {
    async fn initialize(&self, path: &Path) -> Result<()> {
        let path = path.to_path_buf();
        blocking(move || {
            if Repository::open(&path).is_ok() {
                return Err(VcsError::AlreadyInitialized { path });
            }
            Repository::init(&path)?;
            info!(path = %path.display(), "initialized repository");
            Ok(())
        })
        .await
    }

    async fn is_initialized(&self, path: &Path) -> Result<bool> {
        let path = path.to_path_buf();
        blocking(move || match open(&path) {
            Ok(_) => Ok(true),
            Err(VcsError::NotInitialized { .. }) => Ok(false),
            Err(e) => Err(e),
        })
        .await
    }

    async fn commit(&self, path: &Path, message: &str) -> Result<Revision> {
        let path = path.to_path_buf();
        let message = message.to_string();
        let author = self.author.clone();
        blocking(move || {
            let repo = open(&path)?;

            let mut index = repo.index()?;
            let skip: &mut IndexMatchedPath<'_> =
                &mut |file: &Path, _: &[u8]| i32::from(is_partial_write(file));
            index.add_all(["*"].iter(), IndexAddOption::DEFAULT, Some(skip))?;
            index.update_all(["*"].iter(), None)?;
            index.write()?;

            let tree_id = index.write_tree()?;
            let tree = repo.find_tree(tree_id)?;
            let signature = Signature::now(&author.name, &author.email)?;

            let parent = head_commit(&repo)?;
            let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
            let oid = repo.commit(
                Some("HEAD"),
                &signature,
                &signature,
                &message,
                &tree,
                &parents,
            )?;

            let revision = Revision::parse(&oid.to_string())?;
            info!(path = %path.display(), revision = %revision.short(), %message, "committed");
            Ok(revision)
        })
        .await
    }

    async fn log(&self, path: &Path) -> Result<Vec<Commit>> {
        let path = path.to_path_buf();
        blocking(move || {
            let repo = open(&path)?;
            if head_commit(&repo)?.is_none() {
                return Ok(Vec::new());
            }

            let mut walk = repo.revwalk()?;
            walk.push_head()?;
            walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

            let mut commits = Vec::new();
            for oid in walk {
                let commit = repo.find_commit(oid?)?;
                commits.push(Commit {
                    revision: Revision::parse(&commit.id().to_string())?,
                    message: commit.message().unwrap_or_default().trim_end().to_string(),
                    timestamp: DateTime::from_timestamp(commit.time().seconds(), 0)
                        .unwrap_or_default(),
                });
            }
            debug!(path = %path.display(), count = commits.len(), "read log");
            Ok(commits)
        })
        .await
    }

    async fn read_at_revision(
        &self,
        path: &Path,
        file: &Path,
        revision: &Revision,
    ) -> Result<String> {
        let path = path.to_path_buf();
        let file = file.to_path_buf();
        let revision = revision.clone();
        blocking(move || {
            let repo = open(&path)?;

            let commit = repo
                .revparse_single(revision.as_str())
                .and_then(|object| object.peel_to_commit())
                .map_err(|_| VcsError::RevisionNotFound {
                    revision: revision.to_string(),
                })?;

            let tree = commit.tree()?;
            let missing = || VcsError::FileNotFound {
                revision: revision.clone(),
                file: file.clone(),
            };
            let entry = match tree.get_path(&file) {
                Ok(entry) => entry,
                Err(e) if e.code() == ErrorCode::NotFound => return Err(missing()),
                Err(e) => return Err(e.into()),
            };
            // A directory at that path is not a readable file.
            let blob = entry
                .to_object(&repo)?
                .peel_to_blob()
                .map_err(|_| missing())?;

            String::from_utf8(blob.content().to_vec()).map_err(|_| VcsError::InvalidContent {
                revision: revision.clone(),
                file: file.clone(),
            })
        })
        .await
    }
}

fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| match e.code() {
        ErrorCode::NotFound => VcsError::NotInitialized {
            path: path.to_path_buf(),
        },
        _ => VcsError::Git(e),
    })
}

/// Temp siblings (`.<name>.tmp-<id>`) left by an interrupted atomic write.
fn is_partial_write(file: &Path) -> bool {
    file.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name.contains(".tmp-"))
}

fn head_commit(repo: &Repository) -> Result<Option<git2::Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if e.code() == ErrorCode::UnbornBranch => Ok(None),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(VcsError::Git(e)),
    }
}

async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VcsError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn fresh_repo() -> (TempDir, GitBackend) {
        let dir = TempDir::new().unwrap();
        let git = GitBackend::default();
        git.initialize(dir.path()).await.unwrap();
        (dir, git)
    }

    #[tokio::test]
    async fn initialize_creates_repository() {
        let dir = TempDir::new().unwrap();
        let git = GitBackend::default();
        assert!(!git.is_initialized(dir.path()).await.unwrap());
        git.initialize(dir.path()).await.unwrap();
        assert!(git.is_initialized(dir.path()).await.unwrap());
        assert!(dir.path().join(".git").exists());
    }

    #[tokio::test]
    async fn initialize_twice_fails() {
        let (dir, git) = fresh_repo().await;
        let err = git.initialize(dir.path()).await.unwrap_err();
        assert!(matches!(err, VcsError::AlreadyInitialized { .. }));
    }

    #[tokio::test]
    async fn log_of_missing_repository_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = GitBackend::default().log(dir.path()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn fresh_repository_has_empty_log() {
        let (dir, git) = fresh_repo().await;
        assert!(git.log(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn log_is_newest_first() {
        let (dir, git) = fresh_repo().await;
        fs::write(dir.path().join("a.json"), "1").unwrap();
        let first = git.commit(dir.path(), "first").await.unwrap();
        fs::write(dir.path().join("a.json"), "2").unwrap();
        let second = git.commit(dir.path(), "second").await.unwrap();

        let log = git.log(dir.path()).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].revision, second);
        assert_eq!(log[0].message, "second");
        assert_eq!(log[1].revision, first);
    }

    #[tokio::test]
    async fn empty_commit_still_advances_history() {
        let (dir, git) = fresh_repo().await;
        fs::write(dir.path().join("a.json"), "1").unwrap();
        let first = git.commit(dir.path(), "first").await.unwrap();
        let snapshot = git.commit(dir.path(), "snapshot").await.unwrap();
        assert_ne!(first, snapshot);
        assert_eq!(git.log(dir.path()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn commit_uses_configured_author() {
        let (dir, _) = fresh_repo().await;
        let git = GitBackend::new(GitAuthor {
            name: "Ada".into(),
            email: "ada@example.com".into(),
        });
        fs::write(dir.path().join("a.json"), "1").unwrap();
        let rev = git.commit(dir.path(), "authored").await.unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        let commit = repo
            .find_commit(git2::Oid::from_str(rev.as_str()).unwrap())
            .unwrap();
        assert_eq!(commit.author().name(), Some("Ada"));
        assert_eq!(commit.committer().email(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn read_at_revision_sees_old_content() {
        let (dir, git) = fresh_repo().await;
        fs::create_dir_all(dir.path().join("blocks/b1")).unwrap();
        fs::write(dir.path().join("blocks/b1/manifest.json"), "old").unwrap();
        let old = git.commit(dir.path(), "old").await.unwrap();
        fs::write(dir.path().join("blocks/b1/manifest.json"), "new").unwrap();
        let new = git.commit(dir.path(), "new").await.unwrap();

        let file = Path::new("blocks/b1/manifest.json");
        assert_eq!(git.read_at_revision(dir.path(), file, &old).await.unwrap(), "old");
        assert_eq!(git.read_at_revision(dir.path(), file, &new).await.unwrap(), "new");
        // Working tree untouched.
        assert_eq!(
            fs::read_to_string(dir.path().join("blocks/b1/manifest.json")).unwrap(),
            "new"
        );
    }

    #[tokio::test]
    async fn deletions_are_staged() {
        let (dir, git) = fresh_repo().await;
        fs::create_dir_all(dir.path().join("blocks/b1")).unwrap();
        fs::write(dir.path().join("blocks/b1/manifest.json"), "x").unwrap();
        let before = git.commit(dir.path(), "add").await.unwrap();
        fs::remove_dir_all(dir.path().join("blocks/b1")).unwrap();
        let after = git.commit(dir.path(), "remove").await.unwrap();

        let file = Path::new("blocks/b1/manifest.json");
        assert!(git.read_at_revision(dir.path(), file, &before).await.is_ok());
        let err = git.read_at_revision(dir.path(), file, &after).await.unwrap_err();
        assert!(matches!(err, VcsError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn leftover_temp_files_are_not_committed() {
        let (dir, git) = fresh_repo().await;
        fs::write(dir.path().join("manifest.json"), "{}").unwrap();
        fs::write(dir.path().join(".manifest.json.tmp-0190abcd"), "partial").unwrap();
        let rev = git.commit(dir.path(), "first").await.unwrap();

        assert!(git
            .read_at_revision(dir.path(), Path::new("manifest.json"), &rev)
            .await
            .is_ok());
        let err = git
            .read_at_revision(dir.path(), Path::new(".manifest.json.tmp-0190abcd"), &rev)
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_revision_is_not_found() {
        let (dir, git) = fresh_repo().await;
        fs::write(dir.path().join("a.json"), "1").unwrap();
        git.commit(dir.path(), "first").await.unwrap();

        let bogus = Revision::parse(&"0".repeat(40)).unwrap();
        let err = git
            .read_at_revision(dir.path(), Path::new("a.json"), &bogus)
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::RevisionNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn directory_path_is_not_a_file() {
        let (dir, git) = fresh_repo().await;
        fs::create_dir_all(dir.path().join("blocks/b1")).unwrap();
        fs::write(dir.path().join("blocks/b1/manifest.json"), "x").unwrap();
        let rev = git.commit(dir.path(), "add").await.unwrap();
        let err = git
            .read_at_revision(dir.path(), Path::new("blocks/b1"), &rev)
            .await
            .unwrap_err();
        assert!(matches!(err, VcsError::FileNotFound { .. }));
    }
}
