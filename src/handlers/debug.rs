use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::middlewares::auth::{request_cookies, resolve_principal, session_token};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDebugResponse {
    pub authenticated: bool,
    pub user_id: Option<Uuid>,
    pub session_exists: bool,
    pub cookies_count: usize,
    /// Cookie names only, never values
    pub cookies: Vec<String>,
}

/// Describe how the request's session resolved (debug mode only)
#[utoipa::path(
    get,
    path = "/api/debug/session",
    responses(
        (status = 200, description = "Session resolution summary", body = SessionDebugResponse)
    ),
    tag = "Debug"
)]
pub async fn session_debug(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionDebugResponse> {
    let principal = resolve_principal(&headers, &state.config);
    let cookies: Vec<String> = request_cookies(&headers)
        .map(|(name, _)| name.to_string())
        .collect();

    tracing::debug!(
        authenticated = principal.is_some(),
        cookies = cookies.len(),
        "Session debug"
    );

    Json(SessionDebugResponse {
        authenticated: principal.is_some(),
        user_id: principal.map(|p| p.id),
        session_exists: session_token(&headers).is_some(),
        cookies_count: cookies.len(),
        cookies,
    })
}
