use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::agent_workflow::{ContentType, SerpEntry, SerpResult};
use crate::search::{MAX_RESULTS, SearchProvider};

const VIDEO_HOSTS: [&str; 3] = ["youtube.com", "youtu.be", "vimeo.com"];
const FORUM_HOSTS: [&str; 4] = [
    "reddit.com",
    "quora.com",
    "stackexchange.com",
    "stackoverflow.com",
];
const REFERENCE_HOSTS: [&str; 2] = ["wikipedia.org", "britannica.com"];

/// Step two: look up who currently ranks for the primary keyword.
/// Without a search provider it answers with placeholder competitors.
pub struct SerpAnalyst {
    search: Option<Arc<dyn SearchProvider>>,
}

impl SerpAnalyst {
    pub fn new(search: Option<Arc<dyn SearchProvider>>) -> Self {
        Self { search }
    }

    pub async fn run(&self, primary_keyword: &str) -> Result<SerpResult> {
        info!("[Agent 2] SERP Analyst researching: {}", primary_keyword);

        let Some(search) = &self.search else {
            warn!("SERP API key not configured, using placeholder results");
            return Ok(placeholder_result(primary_keyword));
        };

        let organic = search.search(primary_keyword).await?;
        let top_results = organic
            .into_iter()
            .take(MAX_RESULTS)
            .enumerate()
            .map(|(i, r)| SerpEntry {
                rank: r.position.unwrap_or(i as u32 + 1),
                content_type: classify_content(&r.title, &r.link),
                title: r.title,
                snippet: r.snippet,
                url: r.link,
            })
            .collect();

        Ok(analyze(primary_keyword, top_results, false))
    }
}

/// Deterministic stand-in results used when no search key is configured
pub fn placeholder_result(primary_keyword: &str) -> SerpResult {
    let slug = primary_keyword.split_whitespace().collect::<Vec<_>>().join("-");
    let top_results = (1..=MAX_RESULTS as u32)
        .map(|rank| {
            let title = format!("Result {}: {} - Example Site", rank, primary_keyword);
            let url = format!("https://example{}.com/{}", rank, slug);
            SerpEntry {
                rank,
                content_type: classify_content(&title, &url),
                title,
                snippet: format!(
                    "This is a comprehensive guide about {}. Learn everything you need to know...",
                    primary_keyword
                ),
                url,
            }
        })
        .collect();

    analyze(primary_keyword, top_results, true)
}

fn analyze(primary_keyword: &str, top_results: Vec<SerpEntry>, placeholder: bool) -> SerpResult {
    let titles: Vec<&str> = top_results.iter().map(|e| e.title.as_str()).collect();
    let title_patterns = title_patterns(&titles);
    let content_formats = content_formats(&top_results);
    debug!(
        "SERP patterns: {:?}, formats: {:?}",
        title_patterns, content_formats
    );

    SerpResult {
        primary_keyword: primary_keyword.to_string(),
        top_results,
        title_patterns,
        content_formats,
        placeholder,
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_year(word: &str) -> bool {
    word.len() == 4
        && word.chars().all(|c| c.is_ascii_digit())
        && (word.starts_with("19") || word.starts_with("20"))
}

fn is_count(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) && !is_year(word)
}

fn host_matches(url: &str, hosts: &[&str]) -> bool {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };
    hosts
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
}

/// Judges the format of a ranking page from its host, then its title
pub fn classify_content(title: &str, url: &str) -> ContentType {
    let lower = title.to_lowercase();
    let words = words(title);
    let has = |w: &str| words.iter().any(|x| x == w);

    if host_matches(url, &VIDEO_HOSTS) || has("video") {
        ContentType::Video
    } else if host_matches(url, &FORUM_HOSTS) {
        ContentType::Forum
    } else if host_matches(url, &REFERENCE_HOSTS) {
        ContentType::Reference
    } else if ["calculator", "generator", "checker", "tool"]
        .iter()
        .any(|w| has(*w))
    {
        ContentType::Tool
    } else if has("vs") || has("versus") || has("comparison") {
        ContentType::Comparison
    } else if words.first().is_some_and(|w| is_count(w)) || has("best") || has("top") {
        ContentType::Listicle
    } else if lower.contains("how to") || has("guide") || has("tutorial") {
        ContentType::Guide
    } else {
        ContentType::Article
    }
}

/// Counts recurring title patterns, e.g. "How to (3/10)", most frequent first
pub fn title_patterns(titles: &[&str]) -> Vec<String> {
    let checks: [(&str, fn(&str, &[String]) -> bool); 7] = [
        ("How to", |lower, _| lower.contains("how to")),
        ("Best", |_, words| words.iter().any(|w| w == "best")),
        ("Top N", |_, words| {
            words
                .windows(2)
                .any(|pair| pair[0] == "top" && is_count(&pair[1]))
        }),
        ("Numbered list", |_, words| words.first().is_some_and(|w| is_count(w))),
        ("Year", |_, words| words.iter().any(|w| is_year(w))),
        ("Question", |lower, words| {
            lower.trim_end().ends_with('?')
                || words
                    .first()
                    .is_some_and(|w| matches!(w.as_str(), "what" | "why" | "when" | "which" | "who"))
        }),
        ("Guide", |_, words| words.iter().any(|w| w == "guide")),
    ];

    let mut counts: Vec<(&str, usize)> = checks
        .iter()
        .map(|(label, check)| {
            let count = titles
                .iter()
                .filter(|title| check(&title.to_lowercase(), &words(title)))
                .count();
            (*label, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(label, count)| format!("{} ({}/{})", label, count, titles.len()))
        .collect()
}

/// Content types among the results, e.g. "listicle (4)", most frequent first
pub fn content_formats(entries: &[SerpEntry]) -> Vec<String> {
    let mut counts: HashMap<ContentType, (usize, usize)> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        counts.entry(entry.content_type).or_insert((0, i)).0 += 1;
    }

    let mut ranked: Vec<(ContentType, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
    ranked
        .into_iter()
        .map(|(kind, (count, _))| format!("{} ({})", kind.label(), count))
        .collect()
}
