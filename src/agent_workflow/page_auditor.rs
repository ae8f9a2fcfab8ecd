use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::agent_workflow::{Heading, LinkBreakdown, PageAuditResult};
use crate::scraper::{PageScraper, ScrapedPage};

const MAX_KEYWORDS: usize = 10;
const MIN_KEYWORD_LEN: usize = 3;
const TITLE_WEIGHT: usize = 2;
const META_KEYWORD_WEIGHT: usize = 2;
const HEADING_WEIGHT: usize = 1;

const TITLE_LENGTH: RangeInclusive<usize> = 50..=60;
const DESCRIPTION_LENGTH: RangeInclusive<usize> = 120..=160;
const THIN_CONTENT_WORDS: usize = 300;
const MIN_SUBHEADINGS: usize = 2;

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("static selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("static selector"));
static META_DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).expect("static selector"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("static selector"));

static STOP_WORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    stop_words::get(stop_words::LANGUAGE::English)
        .into_iter()
        .map(|x| x.to_string())
        .collect()
});

/// Step one: scrape the page and read its on-page signals
pub struct PageAuditor {
    scraper: Arc<dyn PageScraper>,
}

impl PageAuditor {
    pub fn new(scraper: Arc<dyn PageScraper>) -> Self {
        Self { scraper }
    }

    pub async fn run(&self, url: &Url) -> Result<PageAuditResult> {
        info!("[Agent 1] Page Auditor analyzing: {}", url);
        let page = self.scraper.scrape(url.as_str()).await?;
        debug!(
            "Scraped {} bytes of markdown, {} bytes of html, {} links",
            page.markdown.len(),
            page.html.len(),
            page.links.len()
        );
        Ok(audit_page(url, &page))
    }
}

/// Maps a scraped page onto the audit record. Pure; no I/O.
pub fn audit_page(url: &Url, page: &ScrapedPage) -> PageAuditResult {
    let document = Html::parse_document(&page.html);

    let title = non_blank(page.metadata.title.as_deref())
        .or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        })
        .unwrap_or_default();

    let meta_description = non_blank(page.metadata.description.as_deref())
        .or_else(|| {
            document
                .select(&META_DESCRIPTION_SELECTOR)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(normalize_whitespace)
        })
        .unwrap_or_default();

    let mut headings = html_headings(&document);
    if headings.is_empty() {
        headings = markdown_headings(&page.markdown);
    }

    let word_count = if page.markdown.trim().is_empty() {
        document
            .select(&BODY_SELECTOR)
            .next()
            .map(|body| body.text().flat_map(str::split_whitespace).count())
            .unwrap_or(0)
    } else {
        count_words(&page.markdown)
    };

    let inferred_keywords = infer_keywords(&title, &page.metadata.keyword_list(), &headings);

    let mut audit = PageAuditResult {
        url: url.to_string(),
        title,
        meta_description,
        headings,
        word_count,
        link_count: page.links.len(),
        link_breakdown: classify_links(url, &page.links),
        inferred_keywords,
        status_code: page.metadata.status_code,
        technical_findings: Vec::new(),
        content_opportunities: Vec::new(),
    };
    audit.technical_findings = technical_findings(&audit);
    audit.content_opportunities = content_opportunities(&audit);
    audit
}

/// Title, description, H1 and HTTP status checks
pub fn technical_findings(audit: &PageAuditResult) -> Vec<String> {
    let mut findings = Vec::new();

    if let Some(code) = audit.status_code.filter(|c| !(200..300).contains(c)) {
        findings.push(format!("Page responded with HTTP {}", code));
    }

    let title_len = audit.title.chars().count();
    if title_len == 0 {
        findings.push("Missing title tag".to_string());
    } else if !TITLE_LENGTH.contains(&title_len) {
        findings.push(format!(
            "Title is {} characters; aim for {}-{}",
            title_len,
            TITLE_LENGTH.start(),
            TITLE_LENGTH.end()
        ));
    }

    let description_len = audit.meta_description.chars().count();
    if description_len == 0 {
        findings.push("Missing meta description".to_string());
    } else if !DESCRIPTION_LENGTH.contains(&description_len) {
        findings.push(format!(
            "Meta description is {} characters; aim for {}-{}",
            description_len,
            DESCRIPTION_LENGTH.start(),
            DESCRIPTION_LENGTH.end()
        ));
    }

    match audit.headings.iter().filter(|h| h.level == 1).count() {
        0 => findings.push("No H1 heading".to_string()),
        1 => {}
        n => findings.push(format!("{} H1 headings; use exactly one", n)),
    }

    findings
}

/// Content gaps worth raising in the report
pub fn content_opportunities(audit: &PageAuditResult) -> Vec<String> {
    let mut opportunities = Vec::new();

    if audit.word_count < THIN_CONTENT_WORDS {
        opportunities.push(format!(
            "Thin content: {} words; expand to at least {}",
            audit.word_count, THIN_CONTENT_WORDS
        ));
    }

    if audit.headings.iter().filter(|h| h.level == 2).count() < MIN_SUBHEADINGS {
        opportunities.push("Add H2 subheadings to break the content into sections".to_string());
    }

    if audit.link_breakdown.internal == 0 {
        opportunities.push("No internal links; link to related pages on the site".to_string());
    }

    if let Some(keyword) = audit.inferred_keywords.first() {
        if !audit.title.to_lowercase().contains(keyword.as_str()) {
            opportunities.push(format!("Primary keyword '{}' is missing from the title", keyword));
        }
        if !audit.meta_description.is_empty()
            && !audit.meta_description.to_lowercase().contains(keyword.as_str())
        {
            opportunities.push(format!(
                "Primary keyword '{}' is missing from the meta description",
                keyword
            ));
        }
    }

    opportunities
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_whitespace)
        .filter(|v| !v.is_empty())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn html_headings(document: &Html) -> Vec<Heading> {
    document
        .select(&HEADING_SELECTOR)
        .filter_map(|el| {
            let level = el.value().name().strip_prefix('h')?.parse().ok()?;
            let text = normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "));
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// ATX headings (`#` to `####`) from markdown content
fn markdown_headings(markdown: &str) -> Vec<Heading> {
    markdown
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let level = line.chars().take_while(|c| *c == '#').count();
            if !(1..=4).contains(&level) {
                return None;
            }
            let rest = &line[level..];
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let text = normalize_whitespace(rest.trim().trim_end_matches('#'));
            (!text.is_empty()).then_some(Heading {
                level: level as u8,
                text,
            })
        })
        .collect()
}

fn comparable_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
}

/// Same-host and relative links count as internal
fn classify_links(base: &Url, links: &[String]) -> LinkBreakdown {
    let base_host = comparable_host(base);
    let mut breakdown = LinkBreakdown::default();

    for link in links {
        let resolved = base.join(link.trim()).ok();
        let is_internal = match resolved.as_ref() {
            Some(u) if matches!(u.scheme(), "http" | "https") => comparable_host(u) == base_host,
            _ => false,
        };
        if is_internal {
            breakdown.internal += 1;
        } else {
            breakdown.external += 1;
        }
    }

    breakdown
}

/// Ranks title, meta keyword and heading terms by weighted frequency.
/// Title and meta keyword terms weigh double; ties keep first-seen order.
pub fn infer_keywords(title: &str, meta_keywords: &[String], headings: &[Heading]) -> Vec<String> {
    let mut scores: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0usize;

    let sources = std::iter::once((title, TITLE_WEIGHT))
        .chain(meta_keywords.iter().map(|k| (k.as_str(), META_KEYWORD_WEIGHT)))
        .chain(headings.iter().map(|h| (h.text.as_str(), HEADING_WEIGHT)));

    for (text, weight) in sources {
        for token in tokenize(text) {
            let entry = scores.entry(token).or_insert_with(|| {
                order += 1;
                (0, order)
            });
            entry.0 += weight;
        }
    }

    let mut ranked: Vec<(String, (usize, usize))> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(term, _)| term)
        .collect()
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !STOP_WORDS.contains(t))
}
