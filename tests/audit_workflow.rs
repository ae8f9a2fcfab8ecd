mod common;

use common::Harness;
use seo_audit::agent_workflow::serp_analyst::placeholder_result;
use seo_audit::error::{AuditError, AuditStep, ValidationError};
use seo_audit::models::{AuditRequest, AuditStatus};

#[tokio::test]
async fn test_end_to_end_with_succeeding_collaborators() {
    let harness = Harness::succeeding();
    let workflow = harness.workflow();

    let response = workflow
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(response.status, AuditStatus::Completed);
    assert!(response.audit_id.starts_with("audit_"));
    assert!(response.error.is_none());

    let page = response.page_audit.as_ref().expect("page audit");
    assert_eq!(page.title, "Example Domain");
    assert!(page.word_count > 0);
    assert_eq!(page.link_count, 1);
    assert_eq!(page.link_breakdown.external, 1);
    assert_eq!(page.inferred_keywords[..2], ["domain", "illustrative"]);
    assert_eq!(page.status_code, Some(200));
    assert!(
        page.technical_findings
            .contains(&"Missing meta description".to_string())
    );
    assert!(
        page.technical_findings
            .contains(&"Title is 14 characters; aim for 50-60".to_string())
    );
    assert!(!page.content_opportunities.is_empty());

    let serp = response.serp_analysis.as_ref().expect("serp analysis");
    assert!(!serp.placeholder);
    assert_eq!(serp.top_results.len(), 3);
    assert_eq!(serp.primary_keyword, page.primary_keyword());
    assert_eq!(serp.content_formats, vec!["article (3)".to_string()]);

    let report = response.report.as_ref().expect("report");
    assert!(report.starts_with("# SEO Audit Report"));
    assert!(!report.ends_with('\n'));

    assert_eq!(harness.scraper_calls(), 1);
    assert_eq!(harness.search_calls(), 1);
    assert_eq!(harness.model_calls(), 1);
}

#[tokio::test]
async fn test_serp_query_is_the_primary_keyword() {
    let harness = Harness::succeeding();
    let response = harness
        .workflow()
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    let queries = harness.search.as_ref().unwrap().queries.lock().unwrap().clone();
    assert_eq!(queries, vec![response.page_audit.unwrap().primary_keyword()]);
}

#[tokio::test]
async fn test_prompt_contains_page_and_serp_data() {
    let harness = Harness::succeeding();
    harness
        .workflow()
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    let prompts = harness.model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("TARGET URL: https://example.com/"));
    assert!(prompts[0].contains("\"title\": \"Example Domain\""));
    assert!(prompts[0].contains("Competitor 2"));
    assert!(prompts[0].contains("Missing meta description"));
    assert!(prompts[0].contains("\"content_opportunities\""));
    assert!(prompts[0].contains("\"title_patterns\""));
    assert!(prompts[0].contains("\"content_type\": \"article\""));
}

#[tokio::test]
async fn test_malformed_urls_never_reach_collaborators() {
    let harness = Harness::succeeding();
    let workflow = harness.workflow();

    for raw in ["", "example.com", "ftp://example.com/file", "http://", "::::"] {
        let result = workflow.run(&AuditRequest::new(raw)).await;
        assert!(
            matches!(result, Err(ValidationError(_))),
            "expected validation error for {:?}",
            raw
        );
    }

    assert_eq!(harness.scraper_calls(), 0);
    assert_eq!(harness.search_calls(), 0);
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn test_scraper_failure_halts_the_workflow() {
    let harness = Harness::succeeding().failing_scraper();

    let response = harness
        .workflow()
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(response.status, AuditStatus::Failed);
    let failure = response.error.expect("failure details");
    assert_eq!(failure.kind, "upstream_error");
    assert_eq!(failure.step, Some(AuditStep::PageAudit));
    assert!(failure.message.contains("timed out"));
    assert!(response.page_audit.is_none());
    assert!(response.serp_analysis.is_none());
    assert!(response.report.is_none());

    assert_eq!(harness.scraper_calls(), 1);
    assert_eq!(harness.search_calls(), 0);
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn test_search_failure_is_propagated_not_replaced() {
    let harness = Harness::succeeding().failing_search();

    let response = harness
        .workflow()
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(response.status, AuditStatus::Failed);
    let failure = response.error.expect("failure details");
    assert_eq!(failure.step, Some(AuditStep::SerpAnalysis));
    assert!(response.serp_analysis.is_none());

    assert_eq!(harness.search_calls(), 1);
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn test_model_failure_marks_the_audit_failed() {
    let harness = Harness::succeeding().model_reply(None);

    let response = harness
        .workflow()
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(response.status, AuditStatus::Failed);
    assert_eq!(
        response.error.expect("failure details").step,
        Some(AuditStep::Optimization)
    );
    assert!(response.report.is_none());
    assert_eq!(harness.model_calls(), 1);
}

#[tokio::test]
async fn test_blank_model_reply_is_an_upstream_error() {
    let harness = Harness::succeeding().model_reply(Some("  \n "));
    let url = seo_audit::agent_workflow::validate_url("https://example.com").unwrap();

    let err = harness.workflow().execute(&url).await.unwrap_err();
    assert!(matches!(
        err,
        AuditError::Upstream {
            step: AuditStep::Optimization,
            ..
        }
    ));
}

#[tokio::test]
async fn test_without_search_key_uses_placeholder() {
    let harness = Harness::succeeding().without_search();
    let response = harness
        .workflow()
        .run(&AuditRequest::new("https://example.com"))
        .await
        .unwrap();

    assert_eq!(response.status, AuditStatus::Completed);
    let page = response.page_audit.unwrap();
    let serp = response.serp_analysis.unwrap();
    assert!(serp.placeholder);
    assert_eq!(serp, placeholder_result(&page.primary_keyword()));
    assert_eq!(harness.search_calls(), 0);
}

#[tokio::test]
async fn test_repeated_runs_are_identical_apart_from_id_and_time() {
    let harness = Harness::succeeding();
    let workflow = harness.workflow();
    let request = AuditRequest::new("https://example.com");

    let first = workflow.run(&request).await.unwrap();
    let second = workflow.run(&request).await.unwrap();

    assert_eq!(first.page_audit, second.page_audit);
    assert_eq!(first.serp_analysis, second.serp_analysis);
    assert_eq!(first.report, second.report);
    assert_ne!(first.audit_id, second.audit_id);
}
