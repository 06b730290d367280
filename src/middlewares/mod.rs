pub mod auth;

pub use auth::{auth_middleware, resolve_principal, AuthUser, SESSION_COOKIE};
