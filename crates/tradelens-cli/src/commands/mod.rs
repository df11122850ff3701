mod batch;
mod cache;
mod enrich;
mod kpis;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};
use tradelens_core::{
    CacheManager, Clock, EngineConfig, EnrichmentEngine, GatewaySource, Pacing, ShipmentSource,
    StaticShipmentSource, SystemClock,
};
use tradelens_store::{DuckDbBlobStore, StoreConfig};
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Envelope, Meta};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let started = Instant::now();
    let engine = build_engine(cli)?;

    let (command, result) = match &cli.command {
        Command::Enrich(args) => ("enrich", enrich::run(args, &engine).await?),
        Command::Batch(args) => ("batch", batch::run(args, &engine).await?),
        Command::Kpis(args) => ("kpis", kpis::run(args, &engine).await?),
        Command::Cache(args) => ("cache", cache::run(args, &engine)),
    };

    let CommandResult { data, warnings } = result;
    Ok(Envelope {
        meta: Meta {
            request_id: Uuid::new_v4(),
            command,
            generated_at: engine.cache().now().format_rfc3339(),
            latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            warnings,
        },
        data,
    })
}

/// Environment config, then CLI overrides on top.
fn resolve_config(cli: &Cli) -> Result<EngineConfig, CliError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(url) = &cli.gateway_url {
        config.gateway_url = Some(url.clone());
    }
    let base = cli
        .delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.pacing.base());
    config.pacing = if cli.adaptive_pacing || config.pacing.is_adaptive() {
        Pacing::adaptive(base)
    } else {
        Pacing::fixed(base)
    };
    Ok(config)
}

fn build_engine(cli: &Cli) -> Result<EnrichmentEngine, CliError> {
    let config = resolve_config(cli)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache = if cli.no_persist {
        CacheManager::memory_only(clock)
    } else {
        open_cache(&config.store_config(), clock)
    };

    let needs_source = !matches!(cli.command, Command::Cache(_));
    let source: Arc<dyn ShipmentSource> = match (&cli.records, &config.gateway_url) {
        (Some(path), _) => Arc::new(load_records(path)?),
        (None, Some(url)) => Arc::new(GatewaySource::new(url.clone(), config.api_key.clone())),
        (None, None) if needs_source => {
            return Err(CliError::Command(String::from(
                "no shipment source: pass --gateway-url or --records, or set TRADELENS_GATEWAY_URL",
            )))
        }
        (None, None) => Arc::new(GatewaySource::offline()),
    };

    Ok(EnrichmentEngine::from_config(&config, source, cache))
}

/// DuckDB-backed cache, or memory only when the store cannot be opened.
fn open_cache(store_config: &StoreConfig, clock: Arc<dyn Clock>) -> CacheManager {
    debug!(db_path = %store_config.db_path.display(), "opening persisted cache");
    match DuckDbBlobStore::open(store_config) {
        Ok(store) => CacheManager::new(Arc::new(store), clock),
        Err(error) => {
            warn!(
                %error,
                db_path = %store_config.db_path.display(),
                "persisted cache tier unavailable, continuing in memory"
            );
            CacheManager::memory_only(clock)
        }
    }
}

fn load_records(path: &Path) -> Result<StaticShipmentSource, CliError> {
    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    StaticShipmentSource::from_json(value).map_err(|error| {
        CliError::Command(format!("invalid records file '{}': {error}", path.display()))
    })
}
