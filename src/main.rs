use seo_audit::app::{create_app, init_tracing};
use seo_audit::config::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Configuration errors are fatal, so load before anything else
    let config = Config::from_env();
    let fallback_filter = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "seo_audit=info,tower_http=debug".to_string());
    init_tracing(&fallback_filter);

    info!("Starting SEO Audit Service...");

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Refusing to start: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded: {:?}", config);

    let app = match create_app(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to create app: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.bind_address()).await {
        Ok(listener) => {
            info!("Server running on {}", config.server_url());
            info!("Health check: GET /health");
            info!("Status: GET /api/status");
            info!("Audit endpoint: POST /api/audit");
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", config.bind_address(), e);
            std::process::exit(1);
        }
    };

    info!("Server starting...");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    } else {
        info!("Server shutdown gracefully");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down SEO Audit Service...");
}
