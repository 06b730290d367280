use uuid::Uuid;

use project_sync::models::{NewProject, Project, ProjectStatus, DEFAULT_PROJECT_COLOR};
use project_sync::services::AuthService;
use project_sync::state::AppState;

/// Authentication info for tests
#[allow(dead_code)]
pub struct TestAuth {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

#[allow(dead_code)]
impl TestAuth {
    /// Get the Authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Get the Cookie header value carrying the session
    pub fn session_cookie(&self) -> String {
        format!("theme=dark; access_token={}", self.token)
    }
}

/// Factory for creating test data
pub struct Factory<'a> {
    state: &'a AppState,
}

#[allow(dead_code)]
impl<'a> Factory<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Mint a session for a fresh principal
    pub fn create_user(&self) -> TestAuth {
        let user_id = Uuid::new_v4();
        let email = format!("test-{}@example.com", user_id);
        let token = AuthService::generate_token(user_id, &email, &self.state.config).unwrap();

        TestAuth {
            user_id,
            email,
            token,
        }
    }

    /// Create a test project
    pub async fn create_project(&self, owner_id: Uuid) -> Project {
        self.create_project_with_name(owner_id, &format!("Test Project {}", Uuid::new_v4()))
            .await
    }

    /// Create a test project with specific name
    pub async fn create_project_with_name(&self, owner_id: Uuid, name: &str) -> Project {
        let input = NewProject {
            name: name.to_string(),
            description: Some("Test project description".to_string()),
            color: DEFAULT_PROJECT_COLOR.to_string(),
            status: ProjectStatus::Active,
        };

        self.state.projects.insert(owner_id, &input).await.unwrap()
    }
}
