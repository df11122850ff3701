use serde_json::json;
use tradelens_core::EnrichmentEngine;

use crate::cli::BatchArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &BatchArgs, engine: &EnrichmentEngine) -> Result<CommandResult, CliError> {
    let quiet = args.quiet;
    let mut on_progress = |completed: usize, total: usize| {
        if !quiet {
            eprintln!("[{completed}/{total}] enriched");
        }
    };

    let report = engine
        .batch_enrich_companies(&args.companies, Some(&mut on_progress))
        .await;

    let mut result = CommandResult::ok(json!({
        "total": report.len(),
        "enriched": report.enriched_count(),
        "results": serde_json::to_value(&report)?,
    }));
    for company in report.empty_ids() {
        result = result.with_warning(format!("no shipment data for '{company}'"));
    }
    Ok(result)
}
