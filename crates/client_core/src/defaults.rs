//! Remembered disambiguation choices: project -> preferred repository.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared::domain::{ProjectId, RepositoryId};

/// Flat mapping from project id to the repository a draft conversion should
/// target without asking again. Loaded once at startup, written back on
/// explicit user action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDefaults {
    #[serde(default)]
    project_repositories: HashMap<ProjectId, RepositoryId>,
}

impl ProjectDefaults {
    pub fn get(&self, project: &ProjectId) -> Option<&RepositoryId> {
        self.project_repositories.get(project)
    }

    pub fn set(&mut self, project: ProjectId, repository: RepositoryId) {
        self.project_repositories.insert(project, repository);
    }

    pub fn clear(&mut self, project: &ProjectId) {
        self.project_repositories.remove(project);
    }

    pub fn is_empty(&self) -> bool {
        self.project_repositories.is_empty()
    }
}

/// Persistence collaborator owning the defaults map. The core only reads the
/// map it was given at startup and emits save requests as effects.
pub trait DefaultsStore: Send + Sync {
    /// Load never fails: a missing or corrupt store yields an empty map.
    fn load(&self) -> ProjectDefaults;

    fn save(&self, defaults: &ProjectDefaults) -> Result<(), std::io::Error>;
}
