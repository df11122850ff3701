use tradelens_core::EnrichmentEngine;

use crate::cli::CompanyArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &CompanyArgs, engine: &EnrichmentEngine) -> Result<CommandResult, CliError> {
    match engine.compute_kpis(&args.company).await? {
        Some(view) => Ok(CommandResult::ok(serde_json::to_value(view)?)),
        None => Ok(CommandResult::ok(serde_json::Value::Null)
            .with_warning(format!("no shipment data for '{}'", args.company))),
    }
}
