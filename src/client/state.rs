use uuid::Uuid;

use crate::models::{Project, UpdateProject};

/// Snapshot of the client-side project cache.
///
/// Transitions consume the current snapshot and return the next one; the
/// store publishes each result as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectsState {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped by `reset`; responses started under an older generation are dropped
    pub generation: u64,
}

impl ProjectsState {
    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn begin_load(self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self
        }
    }

    pub fn loaded(self, projects: Vec<Project>) -> Self {
        Self {
            projects,
            loading: false,
            ..self
        }
    }

    /// Keeps the previous projects: stale but consistent.
    pub fn load_failed(self, message: String) -> Self {
        Self {
            loading: false,
            error: Some(message),
            ..self
        }
    }

    /// Insert a confirmed record at the front.
    pub fn prepend(mut self, project: Project) -> Self {
        self.projects.retain(|p| p.id != project.id);
        self.projects.insert(0, project);
        self.error = None;
        self
    }

    /// Speculative shallow merge of a patch into the matching entry.
    pub fn merge_patch(mut self, id: Uuid, patch: &UpdateProject) -> Self {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.apply_patch(patch);
        }
        self.error = None;
        self
    }

    /// Overwrite an entry with the server's canonical record.
    pub fn replace(mut self, project: Project) -> Self {
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *slot = project;
            self.projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        }
        self
    }

    pub fn remove(mut self, id: Uuid) -> Self {
        self.projects.retain(|p| p.id != id);
        self.error = None;
        self
    }

    pub fn with_error(self, message: String) -> Self {
        Self {
            error: Some(message),
            ..self
        }
    }

    pub fn without_error(self) -> Self {
        Self {
            error: None,
            ..self
        }
    }

    /// Empty snapshot for a new session.
    pub fn reset(self) -> Self {
        Self {
            generation: self.generation + 1,
            ..Self::default()
        }
    }
}
