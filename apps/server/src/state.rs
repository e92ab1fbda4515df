//! Shared application state

use crate::{
    config::{Config, StatusCodeMode, StoreBackend},
    db::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore},
    services::UserService,
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Build the state with the store selected by `database.backend`.
    ///
    /// No connection is opened here; the Postgres pool connects on first use so
    /// the HTTP listener can come up before the database does.
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let pool = create_db_pool(&config)?;
                Arc::new(PostgresDocumentStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Build the state around an already constructed store.
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let user_service = Arc::new(UserService::with_config(store.clone(), &config.users));

        Self {
            config: Arc::new(config),
            store,
            user_service,
        }
    }

    pub fn status_codes(&self) -> StatusCodeMode {
        self.config.server.status_codes
    }
}

fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.database.statement_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // Set statement timeout (max query execution time)
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect_lazy(&config.database.url)
        .map_err(crate::Error::Database)?;

    tracing::info!(
        "Database pool configured (min: {}, max: {})",
        config.database.pool_min_size,
        config.database.pool_max_size
    );

    Ok(pool)
}
