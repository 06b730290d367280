pub mod memory;
pub mod project;

pub use memory::InMemoryProjectRepository;
pub use project::SeaOrmProjectRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewProject, Project, UpdateProject};

/// Durable project collection.
///
/// Every lookup is scoped by owner: a record owned by someone else behaves
/// exactly like a missing one.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects of an owner, most recently updated first
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Project>>;

    /// Find a project by ID within an owner's collection
    async fn find_by_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Project>>;

    /// Insert a project; the repository assigns id and timestamps
    async fn insert(&self, owner_id: Uuid, input: &NewProject) -> AppResult<Project>;

    /// Apply a patch and bump `updated_at`; `None` if no such project
    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &UpdateProject,
    ) -> AppResult<Option<Project>>;

    /// Delete a project; deleting a missing project is not an error
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()>;
}
