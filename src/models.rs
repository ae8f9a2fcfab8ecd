use chrono::Utc;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

use crate::agent_workflow::{CompletedAudit, PageAuditResult, SerpResult};
use crate::config::Config;
use crate::error::{AuditError, AuditStep};

pub const CONFIGURED: &str = "configured";
pub const NOT_CONFIGURED: &str = "not_configured";
pub const MOCK_MODE: &str = "mock_mode";

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Request payload for the audit endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AuditRequest {
    pub url: String,
}

impl AuditRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditFailure {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<AuditStep>,
    pub message: String,
}

/// Response payload for the audit endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AuditResponse {
    pub status: AuditStatus,
    pub audit_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_audit: Option<PageAuditResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serp_analysis: Option<SerpResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AuditFailure>,
    pub timestamp: String,
}

impl AuditResponse {
    /// `audit_<utc date>_<utc time>_<random suffix>`
    pub fn new_id() -> String {
        format!("audit_{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), nanoid!(6, &ID_ALPHABET))
    }

    pub fn completed(audit_id: String, audit: CompletedAudit) -> Self {
        Self {
            status: AuditStatus::Completed,
            audit_id,
            page_audit: Some(audit.page_audit),
            serp_analysis: Some(audit.serp_analysis),
            report: Some(audit.report.markdown_text),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn failed(audit_id: String, err: &AuditError) -> Self {
        Self {
            status: AuditStatus::Failed,
            audit_id,
            page_audit: None,
            serp_analysis: None,
            report: None,
            error: Some(AuditFailure {
                kind: err.kind().to_string(),
                step: err.step(),
                message: err.to_string(),
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AuditStatus::Completed
    }
}

/// Configuration flags reported by the status endpoint and the startup log
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub api: String,
    pub firecrawl: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_configured: bool,
    pub serp: String,
}

impl StatusResponse {
    pub fn from_config(config: &Config) -> Self {
        let firecrawl = if config.firecrawl_api_key.trim().is_empty() {
            NOT_CONFIGURED
        } else {
            CONFIGURED
        };
        // Without a search key the SERP analyst serves placeholder results
        let serp = if config.serp_configured() {
            CONFIGURED
        } else {
            MOCK_MODE
        };

        Self {
            api: "operational".to_string(),
            firecrawl: firecrawl.to_string(),
            llm_provider: config.llm.provider.to_string(),
            llm_model: config.llm.model.clone(),
            llm_configured: !config.llm.api_key.trim().is_empty(),
            serp: serp.to_string(),
        }
    }
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "SEO Audit Team".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
