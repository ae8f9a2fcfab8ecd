pub mod optimization_advisor;
pub mod page_auditor;
pub mod serp_analyst;

use std::sync::Arc;

use optimization_advisor::OptimizationAdvisor;
use page_auditor::PageAuditor;
use reqwest::Url;
use serde::Serialize;
use serp_analyst::SerpAnalyst;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AuditError, AuditStep, ValidationError};
use crate::llm::{self, LanguageModel};
use crate::models::{AuditRequest, AuditResponse};
use crate::scraper::{FirecrawlScraper, PageScraper};
use crate::search::{SearchProvider, SerpApiSearch};

// -- data structures produced by the three steps

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkBreakdown {
    pub internal: usize,
    pub external: usize,
}

/// On-page signals read from the scraped page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageAuditResult {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub word_count: usize,
    pub link_count: usize,
    pub link_breakdown: LinkBreakdown,
    /// Ranked by weight, no duplicates
    pub inferred_keywords: Vec<String>,
    pub status_code: Option<u16>,
    /// Technical problems: title and description length, H1 count, HTTP status
    pub technical_findings: Vec<String>,
    pub content_opportunities: Vec<String>,
}

impl PageAuditResult {
    /// Keyword handed to the SERP analyst: best inferred keyword, then title, then host
    pub fn primary_keyword(&self) -> String {
        if let Some(keyword) = self.inferred_keywords.first() {
            return keyword.clone();
        }
        if !self.title.trim().is_empty() {
            return self.title.trim().to_string();
        }
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }
}

/// Rough format of a ranking page, judged from its title and host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Video,
    Forum,
    Reference,
    Tool,
    Comparison,
    Listicle,
    Guide,
    Article,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Forum => "forum",
            ContentType::Reference => "reference",
            ContentType::Tool => "tool",
            ContentType::Comparison => "comparison",
            ContentType::Listicle => "listicle",
            ContentType::Guide => "guide",
            ContentType::Article => "article",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerpEntry {
    pub rank: u32,
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerpResult {
    pub primary_keyword: String,
    pub top_results: Vec<SerpEntry>,
    /// Title patterns shared by the top results, most frequent first
    pub title_patterns: Vec<String>,
    /// Content types among the top results, most frequent first
    pub content_formats: Vec<String>,
    /// True when no search key is configured and the results are synthetic
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub markdown_text: String,
}

/// Output of a fully successful run
#[derive(Debug, Clone)]
pub struct CompletedAudit {
    pub page_audit: PageAuditResult,
    pub serp_analysis: SerpResult,
    pub report: AuditReport,
}

/// Runs page audit, SERP analysis and report generation in that order
pub struct AuditWorkflow {
    page_auditor: PageAuditor,
    serp_analyst: SerpAnalyst,
    advisor: OptimizationAdvisor,
}

impl AuditWorkflow {
    pub fn new(
        scraper: Arc<dyn PageScraper>,
        search: Option<Arc<dyn SearchProvider>>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            page_auditor: PageAuditor::new(scraper),
            serp_analyst: SerpAnalyst::new(search),
            advisor: OptimizationAdvisor::new(model),
        }
    }

    /// Builds the production collaborators named by the configuration
    pub fn from_config(config: &Config) -> Result<Self, AuditError> {
        let scraper = FirecrawlScraper::new(&config.firecrawl_api_key, &config.firecrawl_base_url)
            .map_err(|e| AuditError::Configuration(format!("{:#}", e)))?;

        let search: Option<Arc<dyn SearchProvider>> = match &config.serp_api_key {
            Some(key) => Some(Arc::new(
                SerpApiSearch::new(key, &config.serp_api_base_url)
                    .map_err(|e| AuditError::Configuration(format!("{:#}", e)))?,
            )),
            None => None,
        };

        let model: Arc<dyn LanguageModel> = Arc::from(llm::from_config(&config.llm));

        Ok(Self::new(Arc::new(scraper), search, model))
    }

    /// Validates the request and runs the audit.
    ///
    /// A malformed URL is returned as `Err` before any collaborator is
    /// touched. Step failures produce `Ok` with a failed response so the
    /// caller still gets an audit id and the failing step.
    pub async fn run(&self, request: &AuditRequest) -> Result<AuditResponse, ValidationError> {
        let url = validate_url(&request.url)?;
        let audit_id = AuditResponse::new_id();

        info!("Starting SEO audit {} for: {}", audit_id, url);
        match self.execute(&url).await {
            Ok(completed) => {
                info!("Audit {} completed", audit_id);
                Ok(AuditResponse::completed(audit_id, completed))
            }
            Err(err) => {
                error!("Audit {} failed: {}", audit_id, err);
                Ok(AuditResponse::failed(audit_id, &err))
            }
        }
    }

    /// Runs the three steps, stopping at the first failure
    pub async fn execute(&self, url: &Url) -> Result<CompletedAudit, AuditError> {
        let page_audit = self
            .page_auditor
            .run(url)
            .await
            .map_err(|e| AuditError::upstream(AuditStep::PageAudit, e))?;
        info!(
            "Page audit complete. Primary keyword: {}",
            page_audit.primary_keyword()
        );

        let serp_analysis = self
            .serp_analyst
            .run(&page_audit.primary_keyword())
            .await
            .map_err(|e| AuditError::upstream(AuditStep::SerpAnalysis, e))?;
        info!(
            "SERP analysis complete. Found {} competitors",
            serp_analysis.top_results.len()
        );

        let report = self
            .advisor
            .run(url.as_str(), &page_audit, &serp_analysis)
            .await
            .map_err(|e| AuditError::upstream(AuditStep::Optimization, e))?;
        info!("Optimization report generated");

        Ok(CompletedAudit {
            page_audit,
            serp_analysis,
            report,
        })
    }
}

/// Accepts absolute http(s) URLs with a host
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError("URL cannot be empty".to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|e| ValidationError(format!("'{}' is not a valid URL: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError(
            "URL must start with http:// or https://".to_string(),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError(format!("'{}' has no host", raw)));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("  http://example.com/path?q=1  ").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_malformed() {
        for raw in [
            "",
            "   ",
            "example.com",
            "not a url",
            "ftp://example.com",
            "mailto:someone@example.com",
            "https://",
            "javascript:alert(1)",
        ] {
            let result = validate_url(raw);
            assert!(
                matches!(result, Err(ValidationError(_))),
                "expected validation error for {:?}",
                raw
            );
        }
    }

    fn page(title: &str, keywords: &[&str]) -> PageAuditResult {
        PageAuditResult {
            url: "https://bread.example/guide".to_string(),
            title: title.to_string(),
            meta_description: String::new(),
            headings: vec![],
            word_count: 0,
            link_count: 0,
            link_breakdown: LinkBreakdown::default(),
            inferred_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            status_code: None,
            technical_findings: vec![],
            content_opportunities: vec![],
        }
    }

    #[test]
    fn test_primary_keyword_fallbacks() {
        assert_eq!(page("Title", &["sourdough", "bread"]).primary_keyword(), "sourdough");
        assert_eq!(page("  Sourdough Guide ", &[]).primary_keyword(), "Sourdough Guide");
        assert_eq!(page("", &[]).primary_keyword(), "bread.example");
    }
}
