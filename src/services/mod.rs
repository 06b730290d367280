pub mod auth;
pub mod project;
pub mod validation;

pub use auth::{AuthService, Claims};
pub use project::ProjectService;
pub use validation::{validate_optional, validate_required, Field};
