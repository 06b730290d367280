use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use sqlx::postgres::PgPool;

use crate::config::{Config, StorageBackend};
use crate::repositories::{InMemoryProjectRepository, ProjectRepository, SeaOrmProjectRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Durable project collection
    pub projects: Arc<dyn ProjectRepository>,
}

impl AppState {
    /// Create a new AppState, connecting to the configured storage backend
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let projects: Arc<dyn ProjectRepository> = match config.storage {
            StorageBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or(AppStateError::MissingDatabaseUrl)?;
                Arc::new(Self::connect_postgres(database_url).await?)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory project storage; data is lost on restart");
                Arc::new(InMemoryProjectRepository::new())
            }
        };

        Ok(Self { config, projects })
    }

    /// Create AppState with a custom repository (for testing)
    pub fn with_repository(config: Config, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { config, projects }
    }

    async fn connect_postgres(database_url: &str) -> Result<SeaOrmProjectRepository, AppStateError> {
        // Connect to PostgreSQL with SQLx (for migrations)
        let pg_pool = PgPool::connect(database_url)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;
        pg_pool.close().await;

        // Connect to PostgreSQL with SeaORM
        let mut opt = ConnectOptions::new(database_url);
        opt.max_connections(100)
            .min_connections(5)
            .sqlx_logging(true);

        let db = Database::connect(opt)
            .await
            .map_err(|e| AppStateError::Postgres(e.to_string()))?;

        Ok(SeaOrmProjectRepository::new(db))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("DATABASE_URL is required for PostgreSQL storage")]
    MissingDatabaseUrl,

    #[error("PostgreSQL connection error: {0}")]
    Postgres(String),

    #[error("Migration error: {0}")]
    Migration(String),
}
