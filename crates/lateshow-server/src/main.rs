use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use lateshow_api::auth::{AppState, AppStateInner};
use lateshow_api::config::{Config, DatabaseLocation};
use lateshow_api::tokens::TokenService;
use lateshow_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lateshow=debug,lateshow_api=debug,lateshow_db=info,tower_http=debug".into()),
        )
        .init();

    // Config (also loads .env)
    let config = Config::from_env()?;

    // Init database
    let db = match &config.database {
        DatabaseLocation::File(path) => Database::open(path)?,
        DatabaseLocation::Memory => {
            warn!("Using an in-memory database; all data is lost on shutdown");
            Database::open_in_memory()?
        }
    };

    // Shared state
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
    let state: AppState = Arc::new(AppStateInner::new(Arc::new(db), tokens)?);

    let app = lateshow_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Lateshow server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
