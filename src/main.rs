//! BookNest server: reads configuration from the environment, prepares the
//! tenant schema, and serves the API.

use booknest::settings::StoreKind;
use booknest::{app, cover, ensure_database_exists, ensure_schema, AppConfig, AppState, ConnectionPool, LibraryStore, MemoryStore, PgStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("booknest=info,tower_http=info")))
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(tenant = %config.tenant, store = ?config.store, "starting booknest");

    let pool = ConnectionPool::new(config.database.clone());
    let store: Arc<dyn LibraryStore> = match config.store {
        StoreKind::Postgres => {
            ensure_database_exists(&config.database.connect_options()?).await?;
            let pg = pool.acquire().await?;
            ensure_schema(&pg, &config.tenant).await?;
            Arc::new(PgStore::new(pg, config.tenant.clone()))
        }
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState {
        store,
        covers: cover::from_config(&config.covers).await,
        rating: config.rating,
        cover_max_bytes: config.covers.max_bytes,
    };

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    pool.release().await;
    Ok(())
}
