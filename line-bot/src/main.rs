//! Declutter Bot web server.
//!
//! This binary:
//! - Loads credentials from the environment (and `.env`, if present)
//! - Loads the flex template once
//! - Serves `GET /` and `POST /webhook` until SIGINT/SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use declutter::{router, AppState, Config, Dispatcher, FlexTemplate, LineClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; real deployments set the environment directly.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(dotenv_loaded, "web_server_starting");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        production = config.production,
        api_base = %config.api_base,
        template_path = %config.template_path.display(),
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );
    if config.uses_placeholders() {
        warn!("credentials_are_placeholders");
    }

    let template =
        FlexTemplate::load(&config.template_path).context("Failed to load flex template")?;

    let client = LineClient::new(
        &config.api_base,
        config.channel_access_token.clone(),
        Duration::from_millis(config.request_timeout_ms),
    )
    .context("Failed to build LINE client")?;
    info!(reply_url = %client.reply_url(), "line_client_created");

    let dispatcher = Dispatcher::new(Arc::new(client), template);
    info!(has_template = dispatcher.has_template(), "dispatcher_ready");

    let port = config.port;
    let app = router(AppState::new(config, dispatcher));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
