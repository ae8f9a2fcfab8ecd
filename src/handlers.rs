use std::sync::Arc;

use axum::{
    Extension,
    extract::{Json, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json as ResponseJson, Response},
};
use tracing::{debug, info, warn};

use crate::agent_workflow::AuditWorkflow;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AuditRequest, HealthResponse, StatusResponse};

/// Shared per-process state handed to every handler
pub struct AppState {
    pub workflow: AuditWorkflow,
    pub status: StatusResponse,
}

impl AppState {
    pub fn new(workflow: AuditWorkflow, config: &Config) -> Self {
        Self {
            workflow,
            status: StatusResponse::from_config(config),
        }
    }
}

/// Health check handler
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");
    Ok(ResponseJson(HealthResponse::ok()))
}

/// Reports which collaborators are configured
pub async fn status_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> AppResult<ResponseJson<StatusResponse>> {
    debug!("Status endpoint called");
    Ok(ResponseJson(state.status.clone()))
}

/// Runs the three-step audit for one URL.
/// 200 when completed, 502 naming the failing step otherwise.
pub async fn audit_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AuditRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("Rejected audit request body: {}", rejection.body_text());
        AppError::ValidationError(rejection.body_text())
    })?;
    info!("Audit endpoint called for URL: {}", payload.url);

    let response = state.workflow.run(&payload).await?;

    let status = if response.is_completed() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, ResponseJson(response)).into_response())
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("The requested resource was not found: {}", uri.path()))
}
