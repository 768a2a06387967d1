use anyhow::Result;

use evoke_service::RetrievalService;

use super::print_json;

pub async fn run_health(service: &RetrievalService, json: bool) -> Result<()> {
    let report = service.health().await;

    if json {
        print_json(&report)?;
    } else {
        let marker = if report.is_ok() { "✓" } else { "✗" };
        println!("\n{} Status: {}", marker, report.status);
        println!("  vectorstore: {}", report.services.vectorstore);
        println!("  ml:          {}", report.services.ml);
    }

    if !report.is_ok() {
        anyhow::bail!("catalog unavailable: {}", report.services.vectorstore);
    }

    Ok(())
}
