use std::env;
use std::fmt;

use crate::error::AuditError;
use crate::llm::LlmProvider;

pub const DEFAULT_FIRECRAWL_BASE_URL: &str = "https://api.firecrawl.dev";
pub const DEFAULT_SERP_API_BASE_URL: &str = "https://serpapi.com";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub firecrawl_api_key: String,
    pub firecrawl_base_url: String,
    /// Absent key means the SERP analyst runs on placeholder data
    pub serp_api_key: Option<String>,
    pub serp_api_base_url: String,
    pub llm: LlmConfig,
}

#[derive(Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self, AuditError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuditError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                AuditError::Configuration(format!("missing required environment variable: {key}"))
            })
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AuditError::Configuration(format!("PORT must be a valid number, got '{raw}'"))
            })?,
            None => 8000,
        };

        let provider: LlmProvider = get("LLM_PROVIDER")
            .unwrap_or_else(|| "openai".to_string())
            .parse()?;
        let llm = LlmConfig {
            provider,
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            api_key: require(provider.api_key_var())?,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: get("RUST_LOG")
                .unwrap_or_else(|| "seo_audit=info,tower_http=debug".to_string()),
            firecrawl_api_key: require("FIRECRAWL_API_KEY")?,
            firecrawl_base_url: get("FIRECRAWL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIRECRAWL_BASE_URL.to_string()),
            serp_api_key: get("SERP_API_KEY"),
            serp_api_base_url: get("SERP_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERP_API_BASE_URL.to_string()),
            llm,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn serp_configured(&self) -> bool {
        self.serp_api_key.is_some()
    }
}

// Keys never reach the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("firecrawl_base_url", &self.firecrawl_base_url)
            .field("serp_configured", &self.serp_configured())
            .field("serp_api_base_url", &self.serp_api_base_url)
            .field("llm_provider", &self.llm.provider)
            .field("llm_model", &self.llm.model)
            .finish()
    }
}
