use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod insights;
mod models;
mod routes;
mod store;

use config::Config;
use store::{MemoryEntryStore, PgEntryStore, SharedStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store: SharedStore = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;

            if config.run_migrations {
                sqlx::migrate!().run(&pool).await?;
                tracing::info!("✅ Migrations applied");
            }

            Arc::new(PgEntryStore::new(pool))
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL not set, entries are kept in memory only");
            Arc::new(MemoryEntryStore::new())
        }
    };

    let app = routes::app(store);

    tracing::info!("🧠 Server running at {}", config.bind_addr);

    axum::serve(
        tokio::net::TcpListener::bind(config.bind_addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
