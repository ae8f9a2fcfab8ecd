use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_RESULTS: usize = 10;

/// Returns ranked organic web results for a keyword
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>>;
}

// -- data structures that capture the search results

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<OrganicResult>,
    pub search_metadata: Option<SearchMetadata>,
    pub search_information: Option<SearchInformation>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchMetadata {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchInformation {
    pub organic_results_state: Option<String>,
}

impl SearchResponse {
    /// SerpAPI reports "no results" as an `error` on a successful search
    pub fn is_empty_success(&self) -> bool {
        let succeeded = self
            .search_metadata
            .as_ref()
            .and_then(|m| m.status.as_deref())
            == Some("Success");
        let fully_empty = self
            .search_information
            .as_ref()
            .and_then(|i| i.organic_results_state.as_deref())
            == Some("Fully empty");
        succeeded || fully_empty
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrganicResult {
    pub position: Option<u32>,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Google results through SerpAPI
#[derive(Clone)]
pub struct SerpApiSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiSearch {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .context("Failed to build SerpAPI HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `api_key_param` must already be URL-encoded
    fn search_url(&self, query: &str, api_key_param: &str) -> String {
        format!(
            "{}/search?engine=google&num={}&q={}&api_key={}",
            self.base_url,
            MAX_RESULTS,
            urlencoding::encode(query),
            api_key_param
        )
    }

    /// Request URL safe to log
    pub fn redacted_url(&self, query: &str) -> String {
        self.search_url(query, "***API_KEY***")
    }
}

#[async_trait]
impl SearchProvider for SerpApiSearch {
    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>> {
        let url = self.search_url(query, &urlencoding::encode(&self.api_key));
        info!("Executing SerpAPI search with URL: {}", self.redacted_url(query));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("SerpAPI request for '{}' failed", query))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("SerpAPI returned {}: {}", status, error_text));
        }

        let body = response.text().await?;
        debug!("SerpAPI response body: {} bytes", body.len());

        let search_response: SearchResponse =
            serde_json::from_str(&body).context("Unexpected SerpAPI response shape")?;
        if let Some(error) = &search_response.error {
            if !search_response.is_empty_success() {
                return Err(anyhow!("SerpAPI error: {}", error));
            }
            warn!("SerpAPI found no results for '{}': {}", query, error);
            return Ok(Vec::new());
        }

        let mut results = search_response.organic_results;
        results.truncate(MAX_RESULTS);
        Ok(results)
    }
}
