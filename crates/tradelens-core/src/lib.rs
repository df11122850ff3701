//! # Tradelens Core
//!
//! Shipment enrichment and KPI aggregation for importer companies.
//!
//! ## Overview
//!
//! Raw bill-of-lading rows for a company are fetched once, normalized into a
//! canonical shape and reduced to the metrics the product shows: TEU volume,
//! FCL/LCL mix, primary transport mode, trend, trade lanes, regional
//! breakdown, monthly volume and top ports. Results are cached for 30 days in
//! a memory tier backed by a persisted tier.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Shipment sources (HTTP gateway, in-memory fixture) |
//! | [`aggregate`] | Trade lane and regional aggregation |
//! | [`batch`] | Ordered batch report |
//! | [`builder`] | Enrichment result and KPI view assembly |
//! | [`cache`] | Two-tier expiring cache |
//! | [`clock`] | Injectable time source |
//! | [`config`] | Engine configuration and environment overrides |
//! | [`data_source`] | Shipment source trait and query/page types |
//! | [`domain`] | Canonical domain types |
//! | [`engine`] | Cache-aware public operations |
//! | [`error`] | Error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`metrics`] | Pure metric calculators |
//! | [`normalize`] | Raw record normalization |
//! | [`pacing`] | Batch pacing policy |
//! | [`regions`] | US state to region table |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tradelens_core::{CacheManager, EnrichmentEngine, GatewaySource, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(GatewaySource::new("https://gateway.example.com", None));
//!     let cache = CacheManager::memory_only(Arc::new(SystemClock));
//!     let engine = EnrichmentEngine::new(source, cache);
//!
//!     if let Some(result) = engine.enrich_company("acme-imports").await? {
//!         println!("{} TEU across {} lanes", result.teu_estimate, result.trade_lanes.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ─▶ EnrichmentEngine ─▶ CacheManager (memory ─▶ persisted)
//!                  │ miss
//!                  ▼
//!           ShipmentSource ─▶ normalize ─▶ metrics + aggregate ─▶ builder
//!                                                                  │
//!                                       CacheManager (both tiers) ◀┘
//! ```

pub mod adapters;
pub mod aggregate;
pub mod batch;
pub mod builder;
pub mod cache;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod normalize;
pub mod pacing;
pub mod regions;

pub use adapters::{GatewaySource, StaticShipmentSource};
pub use batch::BatchReport;
pub use cache::{CacheKind, CacheManager, ExpiringStore, CACHE_NAMESPACE, CACHE_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use data_source::{
    DateRange, ShipmentPage, ShipmentQuery, ShipmentSource, SourceError, SourceErrorKind,
};
pub use domain::*;
pub use engine::{EnrichmentEngine, ProgressFn};
pub use error::{CacheError, ConfigError, ValidationError};
pub use pacing::Pacing;
