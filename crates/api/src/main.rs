use anyhow::Result;
use bancoseguro_api::{router, AppConfig, AppState};
use bancoseguro_business::ThreadRngSource;
use bancoseguro_persistence::{init_database, BankStore, MemoryStore, SqliteStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let store: Arc<dyn BankStore> = match &config.database_url {
        Some(url) => {
            let pool = init_database(url).await?;
            tracing::info!(%url, "using sqlite store");
            Arc::new(SqliteStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, Arc::new(ThreadRngSource));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
