pub mod common;
pub mod debug;
pub mod project;
pub mod seed;

pub use common::AppJson;
pub use debug::{session_debug, SessionDebugResponse};
pub use project::{
    create_project, delete_project, get_project, list_projects, update_project,
    DeleteProjectResponse, ProjectListResponse, ProjectResponse,
};
pub use seed::{seed_projects, SeedResponse};
