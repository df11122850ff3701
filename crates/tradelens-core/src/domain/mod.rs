//! # Domain Models
//!
//! Canonical types for shipment enrichment.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CompanyId`] | Validated company identifier |
//! | [`RawShipmentRecord`] | Loosely-typed BOL row from the gateway |
//! | [`NormalizedShipment`] | Canonical shipment tuple |
//! | [`TradeLane`] | Origin → destination corridor aggregate |
//! | [`RegionalBreakdown`] | Per-region aggregate with market share |
//! | [`EnrichmentResult`] | Full per-company enrichment, the unit of caching |
//! | [`KpiView`] | Dashboard projection with monthly buckets and top ports |
//! | [`UtcDateTime`] | UTC timestamp |

mod company;
mod models;
mod shipment;
mod timestamp;

pub use company::CompanyId;
pub use models::{
    EnrichmentResult, KpiView, MonthlyBucket, PortCount, PrimaryMode, Region, RegionalBreakdown,
    TeuBasis, TradeLane, Trend,
};
pub use shipment::{ContainerClass, ContainerLine, NormalizedShipment, RawShipmentRecord, UNKNOWN};
pub use timestamp::UtcDateTime;
