use std::fmt;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::{anthropic, openai};
use serde::Serialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::AuditError;

const MAX_TOKENS: u64 = 4000;
const OPENAI_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::OpenAi => f.write_str("openai"),
            LlmProvider::Anthropic => f.write_str("anthropic"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => Err(AuditError::Configuration(format!(
                "LLM_PROVIDER must be 'openai' or 'anthropic', got '{other}'"
            ))),
        }
    }
}

/// A text-generation backend the optimization advisor can prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> LlmProvider;

    fn model(&self) -> &str;

    /// Sends one prompt with a system preamble and returns the raw completion text
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

pub struct OpenAiModel {
    client: openai::Client,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(OPENAI_TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();
        debug!("Prompting {} with {} chars", self.model, prompt.len());
        agent
            .prompt(prompt.to_string())
            .await
            .with_context(|| format!("OpenAI completion with {} failed", self.model))
    }
}

pub struct AnthropicModel {
    client: anthropic::Client,
    model: String,
}

impl AnthropicModel {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: anthropic::ClientBuilder::new(api_key).build(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for AnthropicModel {
    fn provider(&self) -> LlmProvider {
        LlmProvider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        // The messages API rejects requests without max_tokens
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .max_tokens(MAX_TOKENS)
            .build();
        debug!("Prompting {} with {} chars", self.model, prompt.len());
        agent
            .prompt(prompt.to_string())
            .await
            .with_context(|| format!("Anthropic completion with {} failed", self.model))
    }
}

/// Picks the provider implementation named by the configuration
pub fn from_config(config: &LlmConfig) -> Box<dyn LanguageModel> {
    match config.provider {
        LlmProvider::OpenAi => Box::new(OpenAiModel::new(&config.api_key, config.model.clone())),
        LlmProvider::Anthropic => {
            Box::new(AnthropicModel::new(&config.api_key, config.model.clone()))
        }
    }
}
