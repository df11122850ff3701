//! CLI argument definitions for tradelens.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `enrich` | Full enrichment for one company |
//! | `batch` | Sequential enrichment for several companies |
//! | `kpis` | KPI projection for one company |
//! | `cache clear` | Drop every cached enrichment and KPI view |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--gateway-url` | `$TRADELENS_GATEWAY_URL` | Shipment gateway base URL |
//! | `--records` | unset | Serve shipments from a local JSON fixture instead |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--no-persist` | `false` | Keep the cache in memory only |
//! | `--delay-ms` | `$TRADELENS_BATCH_DELAY_MS` or `100` | Delay between batch items |
//! | `--adaptive-pacing` | `$TRADELENS_BATCH_PACING` or fixed | Back off after empty results |
//!
//! # Examples
//!
//! ```bash
//! tradelens enrich acme-imports --pretty
//! tradelens --records fixtures.json batch acme globex initech
//! tradelens cache clear
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "tradelens",
    version,
    about = "Shipment enrichment and KPI aggregation for importer companies"
)]
pub struct Cli {
    /// Base URL of the shipment gateway. Overrides TRADELENS_GATEWAY_URL.
    #[arg(long, global = true)]
    pub gateway_url: Option<String>,

    /// JSON file mapping company id to an array of raw shipment rows.
    #[arg(long, global = true, conflicts_with = "gateway_url")]
    pub records: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Do not read or write the on-disk cache.
    #[arg(long, global = true, default_value_t = false)]
    pub no_persist: bool,

    /// Delay between companies in a batch, in milliseconds.
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Widen the batch delay after consecutive companies with no data.
    #[arg(long, global = true, default_value_t = false)]
    pub adaptive_pacing: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enrich one company (trade lanes, regions, TEU, mode, trend).
    Enrich(CompanyArgs),
    /// Enrich several companies one after another.
    Batch(BatchArgs),
    /// Compute dashboard KPIs for one company.
    Kpis(CompanyArgs),
    /// Manage the enrichment cache.
    Cache(CacheArgs),
}

#[derive(Debug, Args)]
pub struct CompanyArgs {
    /// Company identifier as known to the gateway.
    pub company: String,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Company identifiers, processed in the given order.
    #[arg(required = true, num_args = 1..)]
    pub companies: Vec<String>,

    /// Suppress per-company progress lines on stderr.
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Remove cached results from memory and disk. Other data is left alone.
    Clear,
}
