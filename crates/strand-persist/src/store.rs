use std::path::PathBuf;
use std::sync::Arc;

use strand_store::{FileStore, FsSequenceStore, PathResolver, SequenceStore};
use strand_types::{BlockId, Commit, Manifest, ProjectId, Revision, SequenceHash};
use strand_vcs::{GitBackend, VersionControl};
use tracing::{debug, error, info, warn};

use crate::config::StoreConfig;
use crate::entity::Entity;
use crate::error::{PersistError, PersistResult};
use crate::locks::ProjectLocks;
use crate::merge::merge_manifest;
use crate::validation::{ManifestValidator, SchemaValidator};

/// Message used by [`Store::save`] when the caller gives none.
pub const DEFAULT_SAVE_MESSAGE: &str = "project snapshot";

/// Versioned manifest store.
///
/// Each project is a directory holding its own repository; blocks live in
/// `blocks/<id>/` inside it. Sequences are kept outside every repository in
/// a shared content-addressed store.
///
/// Project create, write and merge commit immediately. Block create, write
/// and merge only touch the working tree and are captured by the next
/// project commit or [`Store::save`]. Block delete commits.
pub struct Store {
    config: StoreConfig,
    paths: PathResolver,
    files: FileStore,
    sequences: Arc<dyn SequenceStore>,
    vcs: Arc<dyn VersionControl>,
    validator: Arc<dyn ManifestValidator>,
    locks: ProjectLocks,
}

impl Store {
    /// Store with git history, on-disk sequences and schema validation.
    pub fn new(config: StoreConfig) -> Self {
        let paths = config.paths();
        Self {
            sequences: Arc::new(FsSequenceStore::new(paths.clone())),
            vcs: Arc::new(GitBackend::new(config.author())),
            validator: Arc::new(SchemaValidator),
            locks: ProjectLocks::new(config.serialize_writes),
            files: FileStore::new(),
            paths,
            config,
        }
    }

    pub fn with_sequence_store(mut self, sequences: Arc<dyn SequenceStore>) -> Self {
        self.sequences = sequences;
        self
    }

    pub fn with_version_control(mut self, vcs: Arc<dyn VersionControl>) -> Self {
        self.vcs = vcs;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ManifestValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    // ---- Manifest operations ----

    /// Resolve with the manifest path if the entity exists, at `revision`
    /// when given and in the working tree otherwise.
    pub async fn exists(
        &self,
        entity: &Entity,
        revision: Option<&Revision>,
    ) -> PersistResult<PathBuf> {
        let path = entity.manifest_path(&self.paths);
        let found = match revision {
            None => self.files.exists(&path).await?,
            Some(revision) => self.read_at(entity, revision).await?.is_some(),
        };
        if found {
            Ok(path)
        } else {
            Err(PersistError::NotFound(describe(entity, revision)))
        }
    }

    /// The manifest, or `None` if it does not exist (at `revision`, when
    /// given).
    pub async fn get(
        &self,
        entity: &Entity,
        revision: Option<&Revision>,
    ) -> PersistResult<Option<Manifest>> {
        match revision {
            None => self.read_current(entity).await,
            Some(revision) => match self.read_at(entity, revision).await? {
                Some(text) => parse_manifest(entity.manifest_relative(), &text).map(Some),
                None => Ok(None),
            },
        }
    }

    /// Store a manifest for an entity that does not exist yet.
    ///
    /// Returns the new revision for projects and `None` for blocks.
    pub async fn create(
        &self,
        entity: &Entity,
        manifest: Manifest,
    ) -> PersistResult<Option<Revision>> {
        if self.config.validate_on_create {
            self.validate(entity, &manifest)?;
        }
        let _guard = self.locks.acquire(entity.scope()).await;

        self.require_owner(entity).await?;
        let path = entity.manifest_path(&self.paths);
        if self.files.exists(&path).await? {
            return Err(PersistError::AlreadyExists(entity.to_string()));
        }

        self.prepare(entity).await?;
        self.write_manifest(entity, &manifest).await?;

        let revision = if entity.commits_on_write() {
            let message = format!("create {} {}", entity.kind(), entity.id());
            Some(self.commit_written(entity, message).await?)
        } else {
            None
        };
        info!(%entity, "created");
        Ok(revision)
    }

    /// Validate and store a manifest, replacing any existing one.
    ///
    /// The caller's `id` field is stored as given. Missing directories and
    /// the project repository are created on demand.
    pub async fn write(&self, entity: &Entity, manifest: Manifest) -> PersistResult<Manifest> {
        self.validate(entity, &manifest)?;
        let _guard = self.locks.acquire(entity.scope()).await;
        self.write_locked(entity, manifest).await
    }

    /// Deep-merge `patch` into the stored manifest, then validate and store
    /// the result. The stored `id` always wins.
    pub async fn merge(&self, entity: &Entity, patch: Manifest) -> PersistResult<Manifest> {
        let _guard = self.locks.acquire(entity.scope()).await;

        let existing = self
            .read_current(entity)
            .await?
            .ok_or_else(|| PersistError::NotFound(entity.to_string()))?;
        let merged = merge_manifest(&existing, &patch, entity.id());
        self.validate(entity, &merged)?;
        self.write_locked(entity, merged).await
    }

    /// Remove an entity's directory.
    ///
    /// A block delete is committed, so the block stays readable at earlier
    /// revisions. A project delete removes the repository with it and
    /// returns `None`.
    pub async fn delete(&self, entity: &Entity) -> PersistResult<Option<Revision>> {
        let _guard = self.locks.acquire(entity.scope()).await;

        let path = entity.manifest_path(&self.paths);
        if !self.files.exists(&path).await? {
            return Err(PersistError::NotFound(entity.to_string()));
        }
        self.files.delete_dir_all(&entity.dir(&self.paths)).await?;

        match entity {
            Entity::Project(_) => {
                info!(%entity, "deleted");
                Ok(None)
            }
            Entity::Block { block, .. } => {
                let revision = self
                    .commit_written(entity, format!("delete block {block}"))
                    .await?;
                info!(%entity, revision = %revision.short(), "deleted");
                Ok(Some(revision))
            }
        }
    }

    // ---- Project history ----

    /// Commit the current state of a project, including pending block
    /// changes.
    pub async fn save(
        &self,
        project: &ProjectId,
        message: Option<&str>,
    ) -> PersistResult<Revision> {
        let _guard = self.locks.acquire(project).await;
        let entity = Entity::project(project.clone());
        self.require_present(&entity).await?;

        let message = message.unwrap_or(DEFAULT_SAVE_MESSAGE);
        let revision = self
            .vcs
            .commit(&self.paths.project_dir(project), message)
            .await?;
        info!(%project, revision = %revision.short(), "saved");
        Ok(revision)
    }

    /// Commits of a project, newest first.
    pub async fn history(&self, project: &ProjectId) -> PersistResult<Vec<Commit>> {
        let entity = Entity::project(project.clone());
        self.require_present(&entity).await?;
        Ok(self.vcs.log(&self.paths.project_dir(project)).await?)
    }

    /// Identifiers of every stored project, sorted.
    pub async fn list_projects(&self) -> PersistResult<Vec<ProjectId>> {
        let mut projects = Vec::new();
        for name in self.files.list_dirs(self.paths.data_dir()).await? {
            let Ok(project) = ProjectId::parse(name.as_str()) else {
                warn!(%name, "skipping directory with invalid project id");
                continue;
            };
            if self.files.exists(&self.paths.project_manifest(&project)).await? {
                projects.push(project);
            }
        }
        Ok(projects)
    }

    /// The project whose working tree currently holds `block`.
    pub async fn find_project_for_block(
        &self,
        block: &BlockId,
    ) -> PersistResult<Option<ProjectId>> {
        for project in self.list_projects().await? {
            let path = self.paths.block_manifest(&project, block);
            if self.files.exists(&path).await? {
                return Ok(Some(project));
            }
        }
        Ok(None)
    }

    // ---- Sequences ----

    pub async fn sequence_exists(&self, hash: &SequenceHash) -> PersistResult<bool> {
        Ok(self.sequences.exists(hash).await?)
    }

    /// The stored sequence, or `None` if the hash is unknown.
    pub async fn sequence_get(&self, hash: &SequenceHash) -> PersistResult<Option<String>> {
        match self.sequences.get(hash).await {
            Ok(sequence) => Ok(Some(sequence)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a sequence under `hash`. Writing an existing hash is a no-op.
    pub async fn sequence_write(&self, hash: &SequenceHash, sequence: &str) -> PersistResult<()> {
        Ok(self.sequences.put(hash, sequence).await?)
    }

    /// Compute the hash of `sequence`, store it, and return the hash.
    pub async fn sequence_put(&self, sequence: &str) -> PersistResult<SequenceHash> {
        let hash = SequenceHash::compute(sequence);
        self.sequence_write(&hash, sequence).await?;
        Ok(hash)
    }

    pub async fn sequence_delete(&self, hash: &SequenceHash) -> PersistResult<()> {
        Ok(self.sequences.delete(hash).await?)
    }

    /// The sequence referenced by a block's `sequence.hash`. `None` when the
    /// block, the reference or the stored sequence is missing.
    pub async fn block_sequence(
        &self,
        project: &ProjectId,
        block: &BlockId,
    ) -> PersistResult<Option<String>> {
        let entity = Entity::block(project.clone(), block.clone());
        let Some(manifest) = self.read_current(&entity).await? else {
            return Ok(None);
        };
        match manifest.sequence_hash() {
            Some(hash) => self.sequence_get(&hash).await,
            None => Ok(None),
        }
    }

    // ---- Internals ----

    fn validate(&self, entity: &Entity, manifest: &Manifest) -> PersistResult<()> {
        if self.validator.validate(entity.kind(), manifest) {
            Ok(())
        } else {
            Err(PersistError::InvalidModel(entity.to_string()))
        }
    }

    async fn require_present(&self, entity: &Entity) -> PersistResult<()> {
        if self.files.exists(&entity.manifest_path(&self.paths)).await? {
            Ok(())
        } else {
            Err(PersistError::NotFound(entity.to_string()))
        }
    }

    /// Blocks can only be stored inside an existing project.
    async fn require_owner(&self, entity: &Entity) -> PersistResult<()> {
        match entity {
            Entity::Project(_) => Ok(()),
            Entity::Block { project, .. } => {
                self.require_present(&Entity::project(project.clone())).await
            }
        }
    }

    /// Create the entity's directory and, for projects, its repository.
    async fn prepare(&self, entity: &Entity) -> PersistResult<()> {
        let dir = entity.dir(&self.paths);
        self.files.mkdir_all(&dir).await?;
        if let Entity::Project(project) = entity {
            if !self.vcs.is_initialized(&dir).await? {
                self.vcs.initialize(&dir).await?;
                debug!(%project, "initialized project repository");
            }
        }
        Ok(())
    }

    async fn write_locked(&self, entity: &Entity, manifest: Manifest) -> PersistResult<Manifest> {
        self.require_owner(entity).await?;
        let path = entity.manifest_path(&self.paths);
        if !self.files.exists(&path).await? {
            debug!(%entity, "writing new entity");
            self.prepare(entity).await?;
        }
        self.write_manifest(entity, &manifest).await?;

        if entity.commits_on_write() {
            self.commit_written(entity, format!("update {} {}", entity.kind(), entity.id()))
                .await?;
        }
        debug!(%entity, "written");
        Ok(manifest)
    }

    async fn write_manifest(&self, entity: &Entity, manifest: &Manifest) -> PersistResult<()> {
        let path = entity.manifest_path(&self.paths);
        let text = manifest
            .to_json_pretty()
            .map_err(|e| PersistError::MalformedContent {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        self.files.write(&path, text).await?;
        Ok(())
    }

    /// Commit after a working-tree change. A failure here leaves the
    /// change on disk but out of history.
    async fn commit_written(&self, entity: &Entity, message: String) -> PersistResult<Revision> {
        let dir = self.paths.project_dir(entity.scope());
        match self.vcs.commit(&dir, &message).await {
            Ok(revision) => Ok(revision),
            Err(e) => {
                error!(%entity, %message, error = %e, "change written but not committed");
                Err(e.into())
            }
        }
    }

    async fn read_current(&self, entity: &Entity) -> PersistResult<Option<Manifest>> {
        let path = entity.manifest_path(&self.paths);
        match self.files.read_to_string(&path).await {
            Ok(text) => parse_manifest(path, &text).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Raw manifest text at `revision`, `None` when the project, revision
    /// or file is unknown.
    async fn read_at(&self, entity: &Entity, revision: &Revision) -> PersistResult<Option<String>> {
        let dir = self.paths.project_dir(entity.scope());
        match self
            .vcs
            .read_at_revision(&dir, &entity.manifest_relative(), revision)
            .await
        {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_not_found() => {
                debug!(%entity, %revision, reason = %e, "not present at revision");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_manifest(path: PathBuf, text: &str) -> PersistResult<Manifest> {
    Manifest::from_json(text).map_err(|e| PersistError::MalformedContent {
        path,
        reason: e.to_string(),
    })
}

fn describe(entity: &Entity, revision: Option<&Revision>) -> String {
    match revision {
        Some(revision) => format!("{entity} at {}", revision.short()),
        None => entity.to_string(),
    }
}

// ---- Convenience entry points ----

impl Store {
    pub async fn project_exists(
        &self,
        project: &ProjectId,
        revision: Option<&Revision>,
    ) -> PersistResult<PathBuf> {
        self.exists(&Entity::project(project.clone()), revision).await
    }

    pub async fn project_get(
        &self,
        project: &ProjectId,
        revision: Option<&Revision>,
    ) -> PersistResult<Option<Manifest>> {
        self.get(&Entity::project(project.clone()), revision).await
    }

    pub async fn project_create(
        &self,
        project: &ProjectId,
        manifest: Manifest,
    ) -> PersistResult<Option<Revision>> {
        self.create(&Entity::project(project.clone()), manifest).await
    }

    pub async fn project_write(
        &self,
        project: &ProjectId,
        manifest: Manifest,
    ) -> PersistResult<Manifest> {
        self.write(&Entity::project(project.clone()), manifest).await
    }

    pub async fn project_merge(
        &self,
        project: &ProjectId,
        patch: Manifest,
    ) -> PersistResult<Manifest> {
        self.merge(&Entity::project(project.clone()), patch).await
    }

    pub async fn project_delete(&self, project: &ProjectId) -> PersistResult<()> {
        self.delete(&Entity::project(project.clone())).await?;
        Ok(())
    }

    pub async fn block_exists(
        &self,
        project: &ProjectId,
        block: &BlockId,
        revision: Option<&Revision>,
    ) -> PersistResult<PathBuf> {
        self.exists(&Entity::block(project.clone(), block.clone()), revision)
            .await
    }

    pub async fn block_get(
        &self,
        project: &ProjectId,
        block: &BlockId,
        revision: Option<&Revision>,
    ) -> PersistResult<Option<Manifest>> {
        self.get(&Entity::block(project.clone(), block.clone()), revision)
            .await
    }

    pub async fn block_create(
        &self,
        project: &ProjectId,
        block: &BlockId,
        manifest: Manifest,
    ) -> PersistResult<()> {
        self.create(&Entity::block(project.clone(), block.clone()), manifest)
            .await?;
        Ok(())
    }

    pub async fn block_write(
        &self,
        project: &ProjectId,
        block: &BlockId,
        manifest: Manifest,
    ) -> PersistResult<Manifest> {
        self.write(&Entity::block(project.clone(), block.clone()), manifest)
            .await
    }

    pub async fn block_merge(
        &self,
        project: &ProjectId,
        block: &BlockId,
        patch: Manifest,
    ) -> PersistResult<Manifest> {
        self.merge(&Entity::block(project.clone(), block.clone()), patch)
            .await
    }

    pub async fn block_delete(
        &self,
        project: &ProjectId,
        block: &BlockId,
    ) -> PersistResult<Revision> {
        let entity = Entity::block(project.clone(), block.clone());
        self.delete(&entity)
            .await?
            .ok_or_else(|| PersistError::NotFound(entity.to_string()))
    }
}
