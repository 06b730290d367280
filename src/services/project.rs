use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::{
    CreateProjectRequest, NewProject, Project, ProjectStatus, UpdateProject, UpdateProjectRequest,
    DEFAULT_PROJECT_COLOR,
};
use crate::repositories::ProjectRepository;
use crate::services::validation::{
    validate_description, validate_nullable, validate_optional, validate_required, validate_status,
    Field,
};

/// Sample projects inserted by [`ProjectService::seed`]
const SAMPLE_PROJECTS: [(&str, &str, &str, ProjectStatus); 3] = [
    (
        "Website Redesign",
        "Complete overhaul of company website",
        "#3B82F6",
        ProjectStatus::Active,
    ),
    (
        "Mobile App Development",
        "iOS and Android app for customer portal",
        "#10B981",
        ProjectStatus::Active,
    ),
    (
        "Database Migration",
        "Migrate from PostgreSQL 12 to 15",
        "#F59E0B",
        ProjectStatus::Completed,
    ),
];

/// Server-side project operations: authorize, validate, apply.
///
/// Stateless; every call is one round trip to the repository and returns the
/// canonical record.
pub struct ProjectService;

impl ProjectService {
    pub async fn list(repo: &dyn ProjectRepository, user: &AuthUser) -> AppResult<Vec<Project>> {
        repo.list_by_owner(user.id).await
    }

    pub async fn create(
        repo: &dyn ProjectRepository,
        user: &AuthUser,
        input: &CreateProjectRequest,
    ) -> AppResult<Project> {
        let new_project = Self::validate_draft(input)?;
        let project = repo.insert(user.id, &new_project).await?;

        tracing::info!(project_id = %project.id, owner_id = %user.id, "Project created");
        Ok(project)
    }

    /// A missing project is `Ok(None)`, not an error.
    pub async fn get(
        repo: &dyn ProjectRepository,
        user: &AuthUser,
        id: Uuid,
    ) -> AppResult<Option<Project>> {
        repo.find_by_owner(id, user.id).await
    }

    pub async fn update(
        repo: &dyn ProjectRepository,
        user: &AuthUser,
        id: Uuid,
        input: &UpdateProjectRequest,
    ) -> AppResult<Project> {
        let changes = Self::validate_patch(input)?;
        let project = repo
            .update(id, user.id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Project".to_string()))?;

        tracing::info!(project_id = %project.id, owner_id = %user.id, "Project updated");
        Ok(project)
    }

    pub async fn delete(repo: &dyn ProjectRepository, user: &AuthUser, id: Uuid) -> AppResult<()> {
        repo.delete(id, user.id).await?;

        tracing::info!(project_id = %id, owner_id = %user.id, "Project deleted");
        Ok(())
    }

    /// Insert the sample projects for the caller
    pub async fn seed(repo: &dyn ProjectRepository, user: &AuthUser) -> AppResult<Vec<Project>> {
        let mut created = Vec::with_capacity(SAMPLE_PROJECTS.len());
        for (name, description, color, status) in SAMPLE_PROJECTS {
            let input = NewProject {
                name: name.to_string(),
                description: Some(description.to_string()),
                color: color.to_string(),
                status,
            };
            created.push(repo.insert(user.id, &input).await?);
        }

        tracing::info!(owner_id = %user.id, count = created.len(), "Seeded sample projects");
        Ok(created)
    }

    pub fn validate_draft(input: &CreateProjectRequest) -> AppResult<NewProject> {
        let name = validate_required(Field::Name, input.name.as_deref())?;
        let description = validate_description(input.description.as_deref())?;
        let color = validate_optional(Field::Color, input.color.as_deref())?
            .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string());

        Ok(NewProject {
            name,
            description,
            color,
            status: ProjectStatus::Active,
        })
    }

    pub fn validate_patch(input: &UpdateProjectRequest) -> AppResult<UpdateProject> {
        let name = validate_nullable(Field::Name, input.name.as_ref().map(Option::as_deref))?;
        let description = match &input.description {
            None => None,
            Some(value) => Some(validate_description(value.as_deref())?),
        };
        let status = input
            .status
            .as_ref()
            .map(|status| validate_status(status.as_deref()))
            .transpose()?;
        let color = validate_optional(Field::Color, input.color.as_deref())?;

        Ok(UpdateProject {
            name,
            description,
            status,
            color,
        })
    }
}
