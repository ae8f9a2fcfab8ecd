use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(90);

/// Page content as returned by the scraping service
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapedPage {
    pub markdown: String,
    pub html: String,
    pub links: Vec<String>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<MetaKeywords>,
    pub status_code: Option<u16>,
}

/// `<meta name="keywords">` arrives either comma-joined or as a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MetaKeywords {
    Joined(String),
    List(Vec<String>),
}

impl PageMetadata {
    pub fn keyword_list(&self) -> Vec<String> {
        let raw: Vec<&str> = match &self.keywords {
            Some(MetaKeywords::Joined(joined)) => joined.split(',').collect(),
            Some(MetaKeywords::List(list)) => list.iter().map(String::as_str).collect(),
            None => Vec::new(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Fetches and parses a single web page
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage>;
}

#[derive(Debug, Deserialize)]
struct FirecrawlResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapedPage>,
    error: Option<String>,
}

/// Scraper backed by the Firecrawl scrape endpoint.
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct FirecrawlScraper {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlScraper {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SCRAPE_TIMEOUT)
            .build()
            .context("Failed to build Firecrawl HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PageScraper for FirecrawlScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        info!("Scraping URL with Firecrawl: {}", url);

        let response = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "url": url,
                "formats": ["markdown", "html", "links"],
                "onlyMainContent": true,
                "timeout": SCRAPE_TIMEOUT.as_millis() as u64,
            }))
            .send()
            .await
            .with_context(|| format!("Firecrawl request for {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Firecrawl returned {}: {}", status, error_text));
        }

        let body = response.text().await?;
        debug!("Firecrawl response body: {} bytes", body.len());

        let parsed: FirecrawlResponse =
            serde_json::from_str(&body).context("Unexpected Firecrawl response shape")?;
        if !parsed.success {
            return Err(anyhow!(
                "Firecrawl scraping failed: {}",
                parsed.error.unwrap_or_else(|| "no reason given".to_string())
            ));
        }

        parsed
            .data
            .ok_or_else(|| anyhow!("Firecrawl response is missing page data"))
    }
}
