use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::services::{AuthService, Claims};
use crate::state::AppState;

/// Cookie carrying the session token for browser clients
pub const SESSION_COOKIE: &str = "access_token";

/// Authenticated principal extracted from the session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

/// Extractor for AuthUser - can be used directly in handlers
/// Example: `async fn handler(user: AuthUser) -> ... { }`
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// `(name, value)` pairs from every `Cookie` header
pub fn request_cookies(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
}

/// Raw session token from `Authorization: Bearer` or the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    bearer.or_else(|| {
        request_cookies(headers)
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token)
    })
}

/// Resolve the principal of a request; `None` means unauthenticated.
pub fn resolve_principal(headers: &HeaderMap, config: &Config) -> Option<AuthUser> {
    let token = session_token(headers)?;
    match AuthService::verify_token(token, config) {
        Ok(claims) => Some(claims.into()),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            None
        }
    }
}

/// Auth middleware - resolves the principal and injects AuthUser into request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user =
        resolve_principal(request.headers(), &state.config).ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(auth_user);

    // Continue to handler
    Ok(next.run(request).await)
}
