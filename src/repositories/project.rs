use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::project::{self, ActiveModel, Column, Entity as ProjectEntity};
use crate::error::{AppError, AppResult};
use crate::models::{NewProject, Project, UpdateProject};
use crate::repositories::ProjectRepository;

/// PostgreSQL-backed project repository
#[derive(Clone)]
pub struct SeaOrmProjectRepository {
    db: DatabaseConnection,
}

impl SeaOrmProjectRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<project::Model>> {
        let model = ProjectEntity::find_by_id(id)
            .filter(Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?;

        Ok(model)
    }
}

#[async_trait]
impl ProjectRepository for SeaOrmProjectRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Project>> {
        let models = ProjectEntity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .order_by_desc(Column::UpdatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Project::try_from).collect()
    }

    async fn find_by_owner(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Project>> {
        self.find_model(id, owner_id)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn insert(&self, owner_id: Uuid, input: &NewProject) -> AppResult<Project> {
        let now = time::OffsetDateTime::now_utc();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(input.name.clone()),
            description: Set(input.description.clone()),
            status: Set(input.status.as_str().to_string()),
            color: Set(input.color.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await?;
        result.try_into()
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: &UpdateProject,
    ) -> AppResult<Option<Project>> {
        let Some(model) = self.find_model(id, owner_id).await? else {
            return Ok(None);
        };

        // updated_at never moves backwards
        let updated_at = time::OffsetDateTime::now_utc().max(model.updated_at);
        let mut active: ActiveModel = model.into();

        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(description) = &changes.description {
            active.description = Set(description.clone());
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(color) = &changes.color {
            active.color = Set(color.clone());
        }
        active.updated_at = Set(updated_at);

        let result = active.update(&self.db).await?;
        Ok(Some(result.try_into()?))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<()> {
        let result = ProjectEntity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;

        tracing::debug!(project_id = %id, rows = result.rows_affected, "Deleted project");
        Ok(())
    }
}

// Conversion from SeaORM model to our domain model
impl TryFrom<project::Model> for Project {
    type Error = AppError;

    fn try_from(m: project::Model) -> Result<Self, Self::Error> {
        let status = m
            .status
            .parse()
            .map_err(|e| AppError::Internal(format!("Corrupt project row {}: {}", m.id, e)))?;

        Ok(Self {
            id: m.id,
            name: m.name,
            description: m.description,
            owner_id: m.owner_id,
            status,
            color: m.color,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}
