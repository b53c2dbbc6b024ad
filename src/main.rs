use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mcp_exec_daemon::config::ServerConfig;
use mcp_exec_daemon::http::{self, AppState};
use mcp_exec_daemon::port;
use mcp_exec_daemon::rate_limit::RateLimiterStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(ServerConfig::from_env()?);
    config.warn_on_startup();

    let rate_limiter = RateLimiterStore::new();
    rate_limiter.spawn_sweeper().await;

    let listener = port::bind(&config.preferred_port).await?;
    let bound_port = listener.local_addr()?.port();
    let started_at = chrono::Utc::now().to_rfc3339();
    let port_file = port::write_port_file(std::path::Path::new("."), bound_port, &started_at).await?;

    tracing::info!(port = bound_port, server = %config.server_name, "listening");

    let state = AppState {
        config: config.clone(),
        rate_limiter: rate_limiter.clone(),
    };
    let app = http::router(state);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    rate_limiter.destroy().await;
    port::remove_port_file(&port_file).await;
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
