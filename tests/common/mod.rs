#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use seo_audit::agent_workflow::AuditWorkflow;
use seo_audit::config::Config;
use seo_audit::llm::{LanguageModel, LlmProvider};
use seo_audit::scraper::{MetaKeywords, PageMetadata, PageScraper, ScrapedPage};
use seo_audit::search::{OrganicResult, SearchProvider};

pub fn example_page() -> ScrapedPage {
    ScrapedPage {
        markdown: "# Example Domain\n\nThis domain is for use in illustrative examples in documents."
            .to_string(),
        html: "<html><head><title>Example Domain</title></head>\
               <body><h1>Example Domain</h1><p>This domain is for use in illustrative examples \
               in documents.</p><a href=\"https://www.iana.org/domains/example\">More</a></body></html>"
            .to_string(),
        links: vec!["https://www.iana.org/domains/example".to_string()],
        metadata: PageMetadata {
            title: Some("Example Domain".to_string()),
            description: None,
            keywords: Some(MetaKeywords::Joined("example, illustrative".to_string())),
            status_code: Some(200),
        },
    }
}

pub struct MockScraper {
    pub page: Option<ScrapedPage>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn scrape(&self, _url: &str) -> Result<ScrapedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.page
            .clone()
            .ok_or_else(|| anyhow!("Firecrawl request timed out"))
    }
}

pub struct MockSearch {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(anyhow!("SerpAPI returned 401 Unauthorized"));
        }
        Ok((1..=3)
            .map(|i| OrganicResult {
                position: Some(i),
                title: format!("Competitor {i}"),
                link: format!("https://competitor{i}.example/"),
                snippet: format!("Snippet {i}"),
            })
            .collect())
    }
}

pub struct MockModel {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LanguageModel for MockModel {
    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAi
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| anyhow!("model provider returned 500"))
    }
}

/// Mock collaborators plus handles to inspect how they were used
pub struct Harness {
    pub scraper: Arc<MockScraper>,
    pub search: Option<Arc<MockSearch>>,
    pub model: Arc<MockModel>,
}

impl Harness {
    /// All collaborators succeed; search is configured
    pub fn succeeding() -> Self {
        Self {
            scraper: Arc::new(MockScraper {
                page: Some(example_page()),
                calls: AtomicUsize::new(0),
            }),
            search: Some(Arc::new(MockSearch {
                fail: false,
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            })),
            model: Arc::new(MockModel {
                reply: Some("# SEO Audit Report\n\n## Executive Summary\nLooks fine.\n".to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn failing_scraper(mut self) -> Self {
        self.scraper = Arc::new(MockScraper {
            page: None,
            calls: AtomicUsize::new(0),
        });
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search = Some(Arc::new(MockSearch {
            fail: true,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }));
        self
    }

    pub fn without_search(mut self) -> Self {
        self.search = None;
        self
    }

    pub fn model_reply(mut self, reply: Option<&str>) -> Self {
        self.model = Arc::new(MockModel {
            reply: reply.map(str::to_string),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        });
        self
    }

    pub fn workflow(&self) -> AuditWorkflow {
        let search = self
            .search
            .clone()
            .map(|s| s as Arc<dyn SearchProvider>);
        AuditWorkflow::new(self.scraper.clone(), search, self.model.clone())
    }

    pub fn scraper_calls(&self) -> usize {
        self.scraper.calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search
            .as_ref()
            .map(|s| s.calls.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn model_calls(&self) -> usize {
        self.model.calls.load(Ordering::SeqCst)
    }
}

pub fn test_config(serp_key: Option<&str>) -> Config {
    Config::from_lookup(|key| match key {
        "FIRECRAWL_API_KEY" => Some("fc-test".to_string()),
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "SERP_API_KEY" => serp_key.map(str::to_string),
        _ => None,
    })
    .expect("test config")
}
