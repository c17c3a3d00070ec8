//! Bookshelf server. Reads settings from the environment (and `.env`), prepares the store,
//! optionally seeds sample data and serves the API.
//!
//! Run from repo root: `cargo run -p bookshelf-server`
//! Without PostgreSQL: `BOOKSHELF_STORE=memory cargo run -p bookshelf-server`

use bookshelf::{
    app, ensure_database_exists, ensure_schema, seed_sample_data, AppConfig, AppState, PgStore, StoreBackend,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bookshelf=info")))
        .init();

    let config = AppConfig::from_env()?;
    let state = match config.store {
        StoreBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let store = PgStore::connect(&config.database_url, config.max_connections).await?;
            ensure_schema(store.pool()).await?;
            AppState::postgres(store, config.limits)
        }
        StoreBackend::Memory => {
            tracing::info!("using in-memory store; data is lost on exit");
            AppState::in_memory(config.limits)
        }
    };

    if config.seed_sample_data {
        seed_sample_data(&*state.books, &*state.school).await?;
    }

    let router = app(state, config.body_limit_bytes);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
