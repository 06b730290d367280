use std::sync::Arc;

use axum_test::TestServer;
use project_sync::build_router;
use project_sync::config::{Config, StorageBackend};
use project_sync::repositories::InMemoryProjectRepository;
use project_sync::state::AppState;

/// Test configuration
pub fn test_config() -> Config {
    Config {
        storage: StorageBackend::Memory,
        database_url: None,
        jwt_secret: "test-jwt-secret-that-is-at-least-32-characters-long".to_string(),
        jwt_expiration_hours: 24,
        host: "127.0.0.1".to_string(),
        port: 0,
        debug_errors: false,
    }
}

/// Test application wrapper
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    /// Same repository the router uses, for failure injection
    pub repo: InMemoryProjectRepository,
}

#[allow(dead_code)]
impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom configuration
    pub async fn with_config(config: Config) -> Self {
        // In-memory repository avoids a PostgreSQL dependency in tests
        let repo = InMemoryProjectRepository::new();
        let state = AppState::with_repository(config, Arc::new(repo.clone()));

        let router = build_router(state.clone());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            state,
            repo,
        }
    }
}

/// Serve the router on an ephemeral local port and return its base URL
#[allow(dead_code)]
pub async fn spawn_server(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("Test server failed");
    });

    format!("http://{}", addr)
}
