use crate::handlers::{audit_handler, health_check, not_found, status_handler};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/status", get(status_handler))
        .route("/api/audit", post(audit_handler))
        .fallback(not_found)
}
