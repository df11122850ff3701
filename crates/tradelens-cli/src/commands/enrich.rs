use tradelens_core::EnrichmentEngine;

use crate::cli::CompanyArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &CompanyArgs, engine: &EnrichmentEngine) -> Result<CommandResult, CliError> {
    match engine.enrich_company(&args.company).await? {
        Some(result) => Ok(CommandResult::ok(serde_json::to_value(result)?)),
        None => Ok(CommandResult::ok(serde_json::Value::Null)
            .with_warning(format!("no shipment data for '{}'", args.company))),
    }
}
