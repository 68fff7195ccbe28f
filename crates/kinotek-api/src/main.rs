use std::sync::Arc;

use kinotek_api::{build_router, AppState};
use kinotek_core::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinotek=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(config.clone()).await?;

    // Repair any drift left over from a previous run before taking traffic.
    // A failed pass is logged; startup continues either way.
    match state.repair.reconcile().await {
        Ok(report) => tracing::info!(
            fixed_count = report.fixed_count,
            total_count = report.total_count,
            "Startup reconcile pass finished"
        ),
        Err(e) => tracing::warn!(error = %e, "Startup reconcile pass failed"),
    }

    let router = build_router(Arc::clone(&state));
    start_server(&config, router).await
}

/// Start the server with graceful shutdown.
async fn start_server(config: &Config, app: axum::Router) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        video_dir = %config.video_dir().display(),
        thumbnail_dir = %config.thumbnail_dir().display(),
        probe_tool = %config.probe_tool(),
        max_upload_mb = config.max_upload_bytes() / 1024 / 1024,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Listen for Ctrl+C (SIGINT) and SIGTERM to initiate graceful shutdown.
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
