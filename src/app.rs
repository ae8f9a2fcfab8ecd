use std::sync::Arc;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::agent_workflow::AuditWorkflow;
use crate::config::Config;
use crate::error::AuditError;
use crate::handlers::AppState;
use crate::models::StatusResponse;
use crate::routes::create_routes;

/// Initialize tracing and logging for the application.
/// `RUST_LOG` wins over the fallback filter.
pub fn init_tracing(fallback_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Create and configure the Axum application with all routes and middleware
pub fn create_app(config: &Config) -> Result<Router, AuditError> {
    info!("Initializing application router");

    let workflow = AuditWorkflow::from_config(config)?;
    let status = StatusResponse::from_config(config);
    info!(
        "Audit workflow ready (firecrawl: {}, llm: {}/{}, serp: {})",
        status.firecrawl, status.llm_provider, status.llm_model, status.serp
    );

    Ok(router_with_workflow(workflow, config))
}

/// Router around an already-built workflow
pub fn router_with_workflow(workflow: AuditWorkflow, config: &Config) -> Router {
    let state = Arc::new(AppState::new(workflow, config));

    Router::new()
        .merge(create_routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
