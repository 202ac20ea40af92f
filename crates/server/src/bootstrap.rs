use std::sync::Arc;

use racar_core::config::{AppConfig, ConfigError, LoadOptions, StoreBackend};
use racar_db::{
    connect_with_settings, migrations, DbPool, DocumentStore, InMemoryDocumentStore,
    SqliteDocumentStore,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    /// Present only for the SQLite backend.
    pub db_pool: Option<DbPool>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        backend = config.database.backend.as_str(),
        "starting application bootstrap"
    );

    let (store, db_pool): (Arc<dyn DocumentStore>, Option<DbPool>) = match config.database.backend {
        StoreBackend::Memory => (Arc::new(InMemoryDocumentStore::new()), None),
        StoreBackend::Sqlite => {
            let pool = connect_with_settings(
                &config.database.url,
                config.database.max_connections,
                config.database.timeout_secs,
            )
            .await
            .map_err(BootstrapError::DatabaseConnect)?;
            info!(
                event_name = "system.bootstrap.database_connected",
                correlation_id = "bootstrap",
                "database connection established"
            );

            migrations::run_pending(&pool).await.map_err(BootstrapError::Migration)?;
            info!(
                event_name = "system.bootstrap.migrations_applied",
                correlation_id = "bootstrap",
                "database migrations applied"
            );

            (Arc::new(SqliteDocumentStore::new(pool.clone())), Some(pool))
        }
    };

    Ok(Application { config, store, db_pool })
}

#[cfg(test)]
mod tests {
    use racar_core::config::{ConfigOverrides, LoadOptions, StoreBackend};
    use racar_core::Collection;

    use crate::bootstrap::{bootstrap, BootstrapError};

    fn options(backend: StoreBackend, database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_backend: Some(backend),
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn sqlite_bootstrap_applies_migrations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("racar.db").display());

        let app = bootstrap(options(StoreBackend::Sqlite, &url)).await.expect("bootstrap");

        let pool = app.db_pool.as_ref().expect("sqlite backend keeps its pool");
        let tables: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'document'")
                .fetch_one(pool)
                .await
                .expect("schema lookup");
        assert_eq!(tables, 1);
        assert!(app.store.list(Collection::Products).await.expect("list").is_empty());
        pool.close().await;
    }

    #[tokio::test]
    async fn memory_bootstrap_needs_no_database() {
        let app = bootstrap(options(StoreBackend::Memory, "unused")).await.expect("bootstrap");

        assert!(app.db_pool.is_none());
        assert!(app.store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn invalid_sqlite_url_fails_fast() {
        let result = bootstrap(options(StoreBackend::Sqlite, "postgres://localhost/racar")).await;

        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }
}
