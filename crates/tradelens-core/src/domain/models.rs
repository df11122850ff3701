use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{CompanyId, UtcDateTime};

/// Dominant transport mode across a company's shipments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryMode {
    Ocean,
    Air,
    Mixed,
}

/// Direction of shipment volume between the older and newer half of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Flat,
}

impl Trend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a TEU figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeuBasis {
    /// Summed from per-record TEU values or container breakdowns.
    Reported,
    /// Tiered TEU-per-shipment guess; not measured data.
    ShipmentCountHeuristic,
    /// No shipments to estimate from.
    None,
}

/// Origin → destination corridor summary for one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLane {
    pub origin_port: String,
    pub origin_country: String,
    pub destination_port: String,
    pub destination_country: String,
    pub shipment_count: u64,
    pub teu: f64,
    pub fcl_count: u64,
    pub lcl_count: u64,
    /// Distinct suppliers, in first-seen order.
    pub suppliers: Vec<String>,
    pub last_shipment_date: Option<Date>,
}

/// Coarse US destination region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Northeast,
    Southeast,
    Midwest,
    Southwest,
    West,
    /// Default bucket when no state can be resolved.
    Other,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Self::Northeast,
        Self::Southeast,
        Self::Midwest,
        Self::Southwest,
        Self::West,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Northeast => "Northeast",
            Self::Southeast => "Southeast",
            Self::Midwest => "Midwest",
            Self::Southwest => "Southwest",
            Self::West => "West",
            Self::Other => "Other",
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-region shipment totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalBreakdown {
    pub region: Region,
    pub shipment_count: u64,
    pub fcl_count: u64,
    pub lcl_count: u64,
    /// Percentage of all shipments in the result set.
    pub market_share: f64,
    /// At most five suppliers, first-seen order.
    pub top_suppliers: Vec<String>,
}

/// Full enrichment of one company. The unit of work and of caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub company_id: CompanyId,
    pub shipment_count: u64,
    pub teu_estimate: u64,
    pub teu_basis: TeuBasis,
    pub fcl_count: u64,
    pub lcl_count: u64,
    pub primary_mode: Option<PrimaryMode>,
    pub trend: Trend,
    /// Sorted by descending shipment count.
    pub trade_lanes: Vec<TradeLane>,
    pub regions: BTreeMap<Region, RegionalBreakdown>,
    pub computed_at: UtcDateTime,
}

/// Shipment count for one port string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCount {
    pub port: String,
    pub count: u64,
}

/// One calendar month of shipment volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u8,
    pub shipments: u64,
    pub fcl_volume: f64,
    pub lcl_volume: f64,
}

impl MonthlyBucket {
    pub fn empty(year: i32, month: u8) -> Self {
        Self {
            year,
            month,
            shipments: 0,
            fcl_volume: 0.0,
            lcl_volume: 0.0,
        }
    }

    /// `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn is_populated(&self) -> bool {
        self.shipments > 0
    }
}

/// Dashboard-tile projection: KPIs without lane/region aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiView {
    pub company_id: CompanyId,
    pub shipment_count: u64,
    pub teu_estimate: u64,
    pub teu_basis: TeuBasis,
    pub fcl_count: u64,
    pub lcl_count: u64,
    pub trend: Trend,
    pub top_origin_ports: Vec<PortCount>,
    pub top_destination_ports: Vec<PortCount>,
    /// Exactly twelve buckets, oldest first.
    pub monthly_volume: Vec<MonthlyBucket>,
    pub last_shipment_date: Option<Date>,
    pub computed_at: UtcDateTime,
}
