pub mod config;
pub mod database;
pub mod error;
pub mod clock;
pub mod genres;
pub mod schedule;
pub mod models;
pub mod repository;
pub mod controllers;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use clock::{Clock, SystemClock};
use config::StorageBackend;
use repository::{DirectoryRepository, MemoryDirectory, PgDirectory};

// Shared state for every request
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn DirectoryRepository>,
    pub clock: Arc<dyn Clock>,
    pub config: config::Config,
}

impl AppState {
    /// Connects the configured storage backend and runs migrations when it is PostgreSQL.
    pub async fn new(config: config::Config) -> error::Result<Arc<Self>> {
        let repo: Arc<dyn DirectoryRepository> = match config.storage {
            StorageBackend::Postgres => {
                let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
                info!("Database connected");
                db.run_migrations().await?;
                Arc::new(PgDirectory::new(db.pool))
            }
            StorageBackend::Memory => {
                info!("Using in-memory directory, nothing will be persisted");
                Arc::new(MemoryDirectory::new())
            }
        };

        Ok(Self::with_parts(config, repo, Arc::new(SystemClock)))
    }

    pub fn with_parts(
        config: config::Config,
        repo: Arc<dyn DirectoryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self { repo, clock, config })
    }
}

/// Full application router with request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    controllers::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
