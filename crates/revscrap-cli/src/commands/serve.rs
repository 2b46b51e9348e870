use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use revscrap_config::Config;
use revscrap_web::{build_app, AppState};
use tracing::{info, warn};

pub async fn run_serve(mut config: Config, bind: Option<String>, output: &Output) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let addr = config.server.bind_addr().map_err(|e| eyre!("{}", e))?;

    let app = build_app(AppState::from_config(&config), config.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {}", addr))?;

    info!(
        addr = %addr,
        cache = config.cache.enabled,
        fetch_timeout_secs = config.fetch.timeout_secs,
        "Starting server"
    );
    output.success(format!("Revscrap listening on http://{}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
