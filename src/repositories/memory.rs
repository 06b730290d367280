use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewProject, Project, UpdateProject};
use crate::repositories::ProjectRepository;

/// In-memory project repository for tests and `STORAGE=memory`
#[derive(Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<Mutex<HashMap<Uuid, Project>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database("project store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Project>> {
        self.check_available()?;
        let projects = self.projects.lock().await;

        let mut owned: Vec<Project> = projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn find_by_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Project>> {
        self.check_available()?;
        let projects = self.projects.lock().await;
        Ok(projects
            .get(&id)
            .filter(|p| p.owner_id == owner_id)
            .cloned())
    }

    async fn insert(&self, owner_id: Uuid, input: &NewProject) -> AppResult<Project> {
        self.check_available()?;
        let now = time::OffsetDateTime::now_utc();
        let project = Project {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            owner_id,
            status: input.status,
            color: input.color.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut projects = self.projects.lock().await;
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &UpdateProject,
    ) -> AppResult<Option<Project>> {
        self.check_available()?;
        let mut projects = self.projects.lock().await;
        let Some(project) = projects.get_mut(&id).filter(|p| p.owner_id == owner_id) else {
            return Ok(None);
        };

        project.apply_patch(changes);
        project.updated_at = time::OffsetDateTime::now_utc().max(project.updated_at);
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        self.check_available()?;
        let mut projects = self.projects.lock().await;
        if projects.get(&id).is_some_and(|p| p.owner_id == owner_id) {
            projects.remove(&id);
        }
        Ok(())
    }
}
