//! Pure metric calculators over normalized shipments.
//!
//! Nothing here performs I/O or reads the clock; the current date is always
//! passed in so results are deterministic.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use time::{Date, Month};

use crate::domain::{
    ContainerClass, ContainerLine, MonthlyBucket, NormalizedShipment, PortCount, PrimaryMode,
    TeuBasis, Trend, UNKNOWN,
};
use crate::normalize::container_lines;

/// Container size substring → TEU multiplier. Checked in order; first match wins.
pub const TEU_MULTIPLIERS: &[(&str, f64)] = &[("45", 2.25), ("40", 2.0), ("20", 1.0)];

/// Multiplier for container types that match no table entry.
pub const DEFAULT_TEU_MULTIPLIER: f64 = 1.0;

pub const OCEAN_VOCABULARY: &[&str] = &["ocean", "sea", "vessel"];
pub const AIR_VOCABULARY: &[&str] = &["air", "flight"];

const OCEAN_DOMINANT_RATIO: f64 = 0.8;
const AIR_DOMINANT_RATIO: f64 = 0.2;
const TREND_THRESHOLD: f64 = 0.1;

pub const MONTHLY_WINDOW: usize = 12;
pub const TOP_PORTS: usize = 3;

/// Which end of the lane a port ranking looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSide {
    Origin,
    Destination,
}

pub fn teu_multiplier(container_type: &str) -> f64 {
    TEU_MULTIPLIERS
        .iter()
        .find(|(needle, _)| container_type.contains(needle))
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(DEFAULT_TEU_MULTIPLIER)
}

/// Sum of `multiplier × count` over a container breakdown, rounded.
pub fn estimate_teu_from_containers(lines: &[ContainerLine]) -> u64 {
    let total: f64 = lines
        .iter()
        .map(|line| teu_multiplier(&line.container_type) * line.count.max(0.0))
        .sum();
    total.round() as u64
}

/// Same as [`estimate_teu_from_containers`] for an untyped JSON breakdown.
/// Anything other than a list yields 0.
pub fn estimate_teu_from_container_value(value: &Value) -> u64 {
    estimate_teu_from_containers(&container_lines(value))
}

/// Coarse fallback when no container data exists at all.
///
/// Uses an assumed average TEU per shipment that grows with shipper size
/// (≤100 shipments: 5, ≤1000: 8, above: 10). This is a rough heuristic, not
/// measured volume; results built from it carry [`TeuBasis::ShipmentCountHeuristic`].
pub fn estimate_teu_from_shipments(shipment_count: u64) -> u64 {
    let per_shipment = match shipment_count {
        0 => return 0,
        1..=100 => 5,
        101..=1000 => 8,
        _ => 10,
    };
    shipment_count * per_shipment
}

/// Company-level TEU: reported per-record volume when any exists, otherwise
/// the shipment-count heuristic.
pub fn total_teu(shipments: &[NormalizedShipment]) -> (u64, TeuBasis) {
    if shipments.is_empty() {
        return (0, TeuBasis::None);
    }

    let reported: f64 = shipments.iter().map(|shipment| shipment.teu).sum();
    if reported > 0.0 {
        return (reported.round() as u64, TeuBasis::Reported);
    }

    (
        estimate_teu_from_shipments(shipments.len() as u64),
        TeuBasis::ShipmentCountHeuristic,
    )
}

/// `(fcl, lcl)` record counts.
pub fn count_container_classes(shipments: &[NormalizedShipment]) -> (u64, u64) {
    shipments
        .iter()
        .fold((0, 0), |(fcl, lcl), shipment| match shipment.container_class {
            ContainerClass::Fcl => (fcl + 1, lcl),
            ContainerClass::Lcl => (fcl, lcl + 1),
            ContainerClass::Unknown => (fcl, lcl),
        })
}

pub fn classify_primary_mode(shipments: &[NormalizedShipment]) -> PrimaryMode {
    let mut ocean = 0u64;
    let mut air = 0u64;

    for mode in shipments.iter().filter_map(|shipment| shipment.mode.as_deref()) {
        let lowered = mode.to_ascii_lowercase();
        if OCEAN_VOCABULARY.iter().any(|word| lowered.contains(word)) {
            ocean += 1;
        } else if AIR_VOCABULARY.iter().any(|word| lowered.contains(word)) {
            air += 1;
        }
    }

    classify_mode_counts(ocean, air)
}

pub fn classify_mode_counts(ocean: u64, air: u64) -> PrimaryMode {
    let total = ocean + air;
    if total == 0 {
        return PrimaryMode::Ocean;
    }

    let ocean_ratio = ocean as f64 / total as f64;
    if ocean_ratio > OCEAN_DOMINANT_RATIO {
        PrimaryMode::Ocean
    } else if ocean_ratio < AIR_DOMINANT_RATIO {
        PrimaryMode::Air
    } else {
        PrimaryMode::Mixed
    }
}

/// Two-window comparison over `(date, shipment count)` points.
///
/// Points are sorted by date; the older half holds `n / 2` points and the
/// newer half the rest. Fewer than two points is `Flat`.
pub fn classify_trend(points: &[(Date, f64)]) -> Trend {
    if points.len() < 2 {
        return Trend::Flat;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|(date, _)| *date);

    let (older, recent) = sorted.split_at(sorted.len() / 2);
    let older_mean = mean(older);
    let recent_mean = mean(recent);
    let change_ratio = (recent_mean - older_mean) / older_mean.max(1.0);

    if change_ratio > TREND_THRESHOLD {
        Trend::Up
    } else if change_ratio < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Flat
    }
}

/// Trend over dated shipments.
///
/// Plain BOL rows are counted per calendar month, from the first dated month
/// to the last with empty months as zero. When any row carries an explicit
/// quantity the rows are already aggregates and each dated row is one point
/// weighted by its quantity (1 when absent).
pub fn shipment_trend(shipments: &[NormalizedShipment]) -> Trend {
    let dated = shipments
        .iter()
        .filter_map(|shipment| shipment.shipment_date.map(|date| (date, shipment.quantity)));

    if shipments.iter().any(|shipment| shipment.quantity.is_some()) {
        let points: Vec<(Date, f64)> = dated
            .map(|(date, quantity)| (date, quantity.unwrap_or(1.0)))
            .collect();
        return classify_trend(&points);
    }

    classify_trend(&monthly_counts(dated.map(|(date, _)| date)))
}

/// `(first day of month, shipment count)` for every month between the
/// earliest and latest date, inclusive.
fn monthly_counts(dates: impl Iterator<Item = Date>) -> Vec<(Date, f64)> {
    let mut counts: BTreeMap<i64, f64> = BTreeMap::new();
    for date in dates {
        *counts.entry(month_index(date)).or_insert(0.0) += 1.0;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return Vec::new();
    };

    (first..=last)
        .filter_map(|index| {
            let (year, month) = month_from_index(index);
            let month = Month::try_from(month).ok()?;
            let start = Date::from_calendar_date(year, month, 1).ok()?;
            Some((start, counts.get(&index).copied().unwrap_or(0.0)))
        })
        .collect()
}

fn mean(points: &[(Date, f64)]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|(_, value)| value).sum::<f64>() / points.len() as f64
}

/// Twelve calendar-month buckets ending at the month of `today`, oldest first.
///
/// FCL shipments add their TEU (1 when TEU is zero) to the FCL volume and LCL
/// shipments add their TEU as reported; every dated shipment in the window
/// bumps the shipment count.
/// Shipments outside the window are left out of this view only.
pub fn monthly_buckets(shipments: &[NormalizedShipment], today: Date) -> Vec<MonthlyBucket> {
    let end_index = month_index(today);
    let start_index = end_index - (MONTHLY_WINDOW as i64 - 1);

    let mut buckets: Vec<MonthlyBucket> = (start_index..=end_index)
        .map(|index| {
            let (year, month) = month_from_index(index);
            MonthlyBucket::empty(year, month)
        })
        .collect();

    for shipment in shipments {
        let Some(date) = shipment.shipment_date else {
            continue;
        };
        let index = month_index(date);
        if index < start_index || index > end_index {
            continue;
        }

        let bucket = &mut buckets[(index - start_index) as usize];
        bucket.shipments += 1;

        match shipment.container_class {
            ContainerClass::Fcl if shipment.teu > 0.0 => bucket.fcl_volume += shipment.teu,
            ContainerClass::Fcl => bucket.fcl_volume += 1.0,
            ContainerClass::Lcl => bucket.lcl_volume += shipment.teu,
            ContainerClass::Unknown => {}
        }
    }

    buckets
}

fn month_index(date: Date) -> i64 {
    i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1
}

fn month_from_index(index: i64) -> (i32, u8) {
    let year = index.div_euclid(12) as i32;
    let month = (index.rem_euclid(12) + 1) as u8;
    (year, month)
}

/// Top `limit` ports by descending count; ties keep first-seen order.
/// `"Unknown"` ports are not ranked.
pub fn top_ports(shipments: &[NormalizedShipment], side: PortSide, limit: usize) -> Vec<PortCount> {
    let mut order: Vec<PortCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for shipment in shipments {
        let port = match side {
            PortSide::Origin => shipment.origin_port.as_str(),
            PortSide::Destination => shipment.destination_port.as_str(),
        };
        if port == UNKNOWN {
            continue;
        }

        match index.get(port) {
            Some(&position) => order[position].count += 1,
            None => {
                index.insert(port, order.len());
                order.push(PortCount {
                    port: port.to_owned(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(limit);
    order
}

pub fn last_shipment_date(shipments: &[NormalizedShipment]) -> Option<Date> {
    shipments
        .iter()
        .filter_map(|shipment| shipment.shipment_date)
        .max()
}
