//! Lazily created, shared connection pool.

use crate::error::AppError;
use crate::settings::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::Mutex;

/// Memoizes one `PgPool` built from static configuration. Every request
/// shares it; `release` closes it and the next `acquire` reconnects.
pub struct ConnectionPool {
    config: DatabaseConfig,
    pool: Mutex<Option<PgPool>>,
}

impl ConnectionPool {
    pub fn new(config: DatabaseConfig) -> Self {
        ConnectionPool {
            config,
            pool: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) -> Result<PgPool, AppError> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }
        let opts = self.config.connect_options()?;
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect_with(opts)
            .await?;
        tracing::info!(
            host = %self.config.host,
            database = %self.config.database,
            max_connections = self.config.max_connections,
            "database pool created"
        );
        *guard = Some(pool.clone());
        Ok(pool)
    }

    /// No-op when nothing was acquired.
    pub async fn release(&self) {
        let pool = self.pool.lock().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.pool.lock().await.is_some()
    }
}
