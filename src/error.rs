use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The step of the audit workflow that produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStep {
    PageAudit,
    SerpAnalysis,
    Optimization,
}

impl fmt::Display for AuditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditStep::PageAudit => "page_audit",
            AuditStep::SerpAnalysis => "serp_analysis",
            AuditStep::Optimization => "optimization",
        };
        f.write_str(name)
    }
}

/// A request the workflow refuses before contacting any collaborator
#[derive(Debug, thiserror::Error)]
#[error("invalid url: {0}")]
pub struct ValidationError(pub String);

/// Errors raised by the audit steps and by configuration
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("{step} failed: {message}")]
    Upstream { step: AuditStep, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuditError {
    pub fn upstream(step: AuditStep, err: anyhow::Error) -> Self {
        // `{:#}` keeps the anyhow context chain on one line
        AuditError::Upstream {
            step,
            message: format!("{:#}", err),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::Upstream { .. } => "upstream_error",
            AuditError::Configuration(_) => "configuration_error",
        }
    }

    pub fn step(&self) -> Option<AuditStep> {
        match self {
            AuditError::Upstream { step, .. } => Some(*step),
            AuditError::Configuration(_) => None,
        }
    }
}

/// Custom error type for the HTTP layer
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    ValidationError(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.0)
    }
}

/// Result type for application handlers
pub type AppResult<T> = Result<T, AppError>;
