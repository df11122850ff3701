use serde_json::json;
use tradelens_core::{EnrichmentEngine, CACHE_NAMESPACE};

use crate::cli::{CacheArgs, CacheCommand};

use super::CommandResult;

pub fn run(args: &CacheArgs, engine: &EnrichmentEngine) -> CommandResult {
    match args.command {
        CacheCommand::Clear => {
            engine.clear_enrichment_cache();
            CommandResult::ok(json!({
                "cleared": true,
                "namespace": CACHE_NAMESPACE,
            }))
        }
    }
}
