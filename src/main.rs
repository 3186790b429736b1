//! Postnest - a small blog content backend

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postnest::{
    api::{self, AppState},
    config::Config,
    db::{self, DatabasePool},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the debug flag can pick the log level
    let config = Config::load_with_env(Path::new("config.yml"))?;

    let default_filter = if config.server.debug {
        "postnest=debug,tower_http=debug"
    } else {
        "postnest=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Postnest...");
    tracing::info!(
        "Configuration loaded (debug: {}, media root: {:?})",
        config.server.debug,
        config.media.root
    );

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    pool.ping().await?;
    tracing::info!("Database connected: {:?}", pool.driver());

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    std::fs::create_dir_all(&config.media.root)
        .with_context(|| format!("Failed to create media directory: {:?}", config.media.root))?;

    let state = AppState::new(pool.clone(), config.media.clone());
    let app = api::build_router(state, &config);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = wait_for_signal(tokio::signal::ctrl_c(), terminate).await;
    tracing::info!("Received {}, shutting down...", received);
}

/// Resolve with the name of the first signal received.
///
/// A Ctrl+C listener that fails to install never resolves, so the server
/// keeps running until SIGTERM.
async fn wait_for_signal<C, T>(ctrl_c: C, terminate: T) -> &'static str
where
    C: Future<Output = std::io::Result<()>>,
    T: Future<Output = ()>,
{
    let ctrl_c = async {
        if let Err(e) = ctrl_c.await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => "Ctrl+C",
        _ = terminate => "SIGTERM",
    }
}
