use anyhow::Result;
use seo_audit::agent_workflow::AuditWorkflow;
use seo_audit::config::Config;
use seo_audit::init_tracing;
use seo_audit::models::AuditRequest;

/// Runs a single audit against the configured services and prints the report.
///
/// Usage: audit-once <url> [--json]
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: audit-once <url> [--json]"))?;
    let as_json = args.any(|a| a == "--json");

    println!("🔍 Auditing {}", url);
    println!("{}", "=".repeat(50));

    let workflow = AuditWorkflow::from_config(&config)?;
    let response = workflow.run(&AuditRequest::new(url)).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if let Some(report) = &response.report {
        println!("{}", report);
    }

    if let Some(failure) = &response.error {
        eprintln!("❌ {}", failure.message);
        std::process::exit(2);
    }

    Ok(())
}
