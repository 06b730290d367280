use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::Project;
use crate::services::ProjectService;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    pub message: String,
    pub projects: Vec<Project>,
}

/// Create the sample projects for the current user
#[utoipa::path(
    post,
    path = "/api/seed",
    responses(
        (status = 200, description = "Sample data created", body = SeedResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Seeding failed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Seed"
)]
pub async fn seed_projects(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SeedResponse>> {
    let projects = ProjectService::seed(state.projects.as_ref(), &user)
        .await
        .map_err(|e| {
            if state.config.debug_errors {
                AppError::Detailed {
                    error: "Failed to seed data".to_string(),
                    details: match &e {
                        AppError::Database(msg) | AppError::Internal(msg) => msg.clone(),
                        other => other.to_string(),
                    },
                }
            } else {
                e
            }
        })?;

    Ok(Json(SeedResponse {
        message: "Sample data created".to_string(),
        projects,
    }))
}
