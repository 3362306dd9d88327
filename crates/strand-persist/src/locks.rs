use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use strand_types::ProjectId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per project, created on first use.
///
/// Mutations of a project and its blocks hold the project's lock for the
/// whole check/write/commit sequence. Reads never take it.
#[derive(Debug)]
pub struct ProjectLocks {
    enabled: bool,
    locks: Mutex<HashMap<ProjectId, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one mutation. Empty when locking is disabled.
#[derive(Debug)]
#[must_use]
pub struct ProjectGuard {
    _guard: Option<OwnedMutexGuard<()>>,
}

impl ProjectLocks {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn acquire(&self, project: &ProjectId) -> ProjectGuard {
        if !self.enabled {
            return ProjectGuard { _guard: None };
        }
        let lock = {
            let mut locks = self.locks.lock().expect("lock poisoned");
            Arc::clone(locks.entry(project.clone()).or_default())
        };
        ProjectGuard {
            _guard: Some(lock.lock_owned().await),
        }
    }
}
