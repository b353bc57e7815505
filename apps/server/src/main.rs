//! # Till POS Server
//!
//! Startup: tracing, config, database + migrations, bootstrap seeding,
//! router, serve until ctrl-c/SIGTERM.

use tracing::info;
use tracing_subscriber::EnvFilter;

use till_db::{Database, DbConfig};
use till_server::{bootstrap, build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Till POS server...");

    let config = ServerConfig::load()?;
    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    std::fs::create_dir_all(&config.upload_dir)?;

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    bootstrap::run(&db).await?;

    let state = AppState::new(db.clone(), config.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
