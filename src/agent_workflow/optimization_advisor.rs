use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::agent_workflow::{AuditReport, PageAuditResult, SerpResult};
use crate::llm::LanguageModel;

const ADVISOR_PREAMBLE: &str = "You are a senior SEO consultant creating detailed audit reports.";

const REPORT_OUTLINE: &str = r#"INSTRUCTIONS:
Create a professional SEO audit report in Markdown format with these sections:

# SEO Audit Report

## Executive Summary
- Page being audited
- Primary keyword focus
- 2-3 key strengths
- 2-3 critical weaknesses
- Overall SEO health score (estimate)

## Technical & On-Page Findings
### Title Tag Analysis
- Current: [exact title, character count]
- Recommendations: [specific suggestions]
### Meta Description Analysis
- Current: [exact description, character count]
- Recommendations: [specific suggestions]
### Heading Structure
- H1: [current H1]
- H2-H4 Analysis: [structure quality]
- Recommendations: [improvements]
### Content Analysis
- Word Count: [number]
- Content Depth: [assessment]
- Recommendations: [specific improvements]
### Link Profile
- Internal vs external links and what to change
### Technical Findings
- Address every item in `technical_findings` and `content_opportunities`

## Keyword Strategy Analysis
### Primary Keyword: [keyword]
- Current targeting strength, search intent alignment, recommendations
### Secondary Keywords
[List with optimization recommendations]

## Competitive SERP Analysis
### What Top Competitors Are Doing
- Common title patterns (`title_patterns`), dominant content formats (`content_formats`), key themes
### Content Gaps & Opportunities
[Specific opportunities to differentiate]

## Prioritized Recommendations
### P0 - Critical (Implement Immediately)
1. **[Area]**: [Specific action]
   - Rationale: [citing data]
   - Expected Impact: [specific benefit]
   - Effort: [Low/Medium/High]
### P1 - High Priority (Implement This Month)
### P2 - Medium Priority (Implement This Quarter)

## Implementation Roadmap
### Week 1-2
### Week 3-4
### Month 2-3

## Measurement Plan
- KPIs to track, tools to use, expected timeline for results

---

Be specific with data points (e.g., "Title is 45 characters, recommend 55-60").
Use actual numbers and examples from the audit data.
Make recommendations actionable and prioritized."#;

/// Step three: turn the collected data into a markdown report
pub struct OptimizationAdvisor {
    model: Arc<dyn LanguageModel>,
}

impl OptimizationAdvisor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn run(
        &self,
        url: &str,
        page_audit: &PageAuditResult,
        serp_analysis: &SerpResult,
    ) -> Result<AuditReport> {
        info!(
            "[Agent 3] Optimization Advisor generating report with {}/{}",
            self.model.provider(),
            self.model.model()
        );

        let prompt = build_report_prompt(url, page_audit, serp_analysis)?;
        let response = self.model.complete(ADVISOR_PREAMBLE, &prompt).await?;

        let markdown_text = response.trim().to_string();
        if markdown_text.is_empty() {
            bail!("language model returned an empty report");
        }

        Ok(AuditReport { markdown_text })
    }
}

pub fn build_report_prompt(
    url: &str,
    page_audit: &PageAuditResult,
    serp_analysis: &SerpResult,
) -> Result<String> {
    let page_json =
        serde_json::to_string_pretty(page_audit).context("Failed to serialize page audit")?;
    let serp_json =
        serde_json::to_string_pretty(serp_analysis).context("Failed to serialize SERP analysis")?;

    let serp_note = if serp_analysis.placeholder {
        "\nNOTE: search results are placeholders; keep competitive claims general.\n"
    } else {
        ""
    };

    Ok(format!(
        "You are a senior SEO consultant creating a comprehensive optimization report.\n\n\
         TARGET URL: {url}\n\n\
         PAGE AUDIT DATA:\n{page_json}\n\n\
         SERP COMPETITIVE ANALYSIS:\n{serp_json}\n{serp_note}\n\
         {REPORT_OUTLINE}\n"
    ))
}
