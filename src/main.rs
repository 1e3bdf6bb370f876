use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopify_session_app::auth::oauth::ShopifyTokenExchanger;
use shopify_session_app::catalog::CatalogClient;
use shopify_session_app::storage::{MemorySessionStore, PgSessionStore, SessionStore};
use shopify_session_app::web::{router, AppState};
use shopify_session_app::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopify_session_app=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let store: Arc<dyn SessionStore> = if config.database_url() == "memory" {
        tracing::warn!("Using in-memory session store; sessions are lost on restart");
        Arc::new(MemorySessionStore::new())
    } else {
        let store = PgSessionStore::connect(config.database_url()).await?;
        tracing::info!("Database connection pool created");
        store.migrate().await?;
        tracing::info!("Database migrations applied");
        Arc::new(store)
    };

    let cookie_key = match config.cookie_secret() {
        Some(secret) => Key::try_from(secret)?,
        None => {
            tracing::warn!("COOKIE_SECRET not set; cookies will not survive a restart");
            Key::generate()
        }
    };

    let state = AppState {
        store,
        exchanger: Arc::new(ShopifyTokenExchanger::new(&config)),
        catalog: Arc::new(CatalogClient::new(config.api_version().clone())),
        cookie_key,
        config: Arc::new(config),
    };

    let addr = SocketAddr::new(state.config.bind_host().parse()?, state.config.port());
    let app = router(state);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
