//! Property-style tests for the metric calculators and aggregators.
//!
//! Each test pins one documented boundary or invariant using generated
//! shipment sets rather than a single hand-picked example.

use serde_json::json;
use time::{Date, Duration, Month};
use tradelens_core::aggregate::{aggregate_regions, aggregate_trade_lanes};
use tradelens_core::metrics::{
    classify_mode_counts, classify_primary_mode, classify_trend, estimate_teu_from_container_value,
    estimate_teu_from_containers, estimate_teu_from_shipments, monthly_buckets,
};
use tradelens_core::normalize::normalize_all;
use tradelens_core::{
    ContainerClass, ContainerLine, NormalizedShipment, PrimaryMode, RawShipmentRecord, Trend,
};

fn day(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("valid date")
}

fn with_mode(mode: &str) -> NormalizedShipment {
    NormalizedShipment {
        mode: Some(mode.to_owned()),
        ..NormalizedShipment::unknown()
    }
}

fn modes(ocean: usize, air: usize) -> Vec<NormalizedShipment> {
    let mut shipments: Vec<NormalizedShipment> = (0..ocean).map(|_| with_mode("OCEAN")).collect();
    shipments.extend((0..air).map(|_| with_mode("Air Freight")));
    shipments
}

/// Deterministic pseudo-random shipment set covering every endpoint shape.
fn generated_shipments(seed: u64, len: usize) -> Vec<NormalizedShipment> {
    let ports = ["Shanghai", "Busan", "Unknown", "Rotterdam"];
    let countries = ["China", "Unknown", "Netherlands"];
    let states = [Some("CA"), Some("Texas"), None, Some("ZZ")];
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut next = |bound: usize| rng.usize(..bound);

    (0..len)
        .map(|_| NormalizedShipment {
            origin_port: ports[next(ports.len())].to_owned(),
            origin_country: countries[next(countries.len())].to_owned(),
            destination_port: ports[next(ports.len())].to_owned(),
            destination_country: countries[next(countries.len())].to_owned(),
            container_class: [ContainerClass::Fcl, ContainerClass::Lcl, ContainerClass::Unknown]
                [next(3)],
            destination_state: states[next(states.len())].map(str::to_owned),
            ..NormalizedShipment::unknown()
        })
        .collect()
}

// =============================================================================
// TEU estimation
// =============================================================================

#[test]
fn teu_estimators_match_documented_values() {
    assert_eq!(estimate_teu_from_containers(&[ContainerLine::new("40ft", 10.0)]), 20);
    assert_eq!(estimate_teu_from_containers(&[]), 0);
    assert_eq!(estimate_teu_from_shipments(50), 250);
    assert_eq!(estimate_teu_from_shipments(500), 4_000);
    assert_eq!(estimate_teu_from_shipments(2_000), 20_000);
    assert_eq!(estimate_teu_from_shipments(0), 0);
}

#[test]
fn teu_from_untyped_breakdown_ignores_non_lists() {
    assert_eq!(estimate_teu_from_container_value(&json!("40ft x 3")), 0);
    assert_eq!(
        estimate_teu_from_container_value(&json!([{"type": "45HC", "count": 2}, {"type": "20GP", "count": 1}])),
        6
    );
}

// =============================================================================
// Mode and trend boundaries
// =============================================================================

#[test]
fn mode_classification_boundaries() {
    assert_eq!(classify_primary_mode(&modes(9, 1)), PrimaryMode::Ocean);
    assert_eq!(classify_primary_mode(&modes(5, 5)), PrimaryMode::Mixed);
    assert_eq!(classify_primary_mode(&modes(1, 9)), PrimaryMode::Air);
    assert_eq!(classify_primary_mode(&[]), PrimaryMode::Ocean);

    // Exactly 0.8 and 0.2 are not strictly beyond the thresholds.
    assert_eq!(classify_mode_counts(8, 2), PrimaryMode::Mixed);
    assert_eq!(classify_mode_counts(2, 8), PrimaryMode::Mixed);
}

#[test]
fn trend_classification_boundaries() {
    let start = day(2026, Month::January, 1);
    let halves = |older: f64, recent: f64| -> Vec<(Date, f64)> {
        (0..10)
            .map(|i| (start + Duration::days(i), if i < 5 { older } else { recent }))
            .collect()
    };

    assert_eq!(classify_trend(&halves(100.0, 100.0)), Trend::Flat);
    assert_eq!(classify_trend(&halves(100.0, 115.0)), Trend::Up);
    assert_eq!(classify_trend(&halves(100.0, 85.0)), Trend::Down);
    assert_eq!(classify_trend(&[(start, 40.0)]), Trend::Flat);
}

#[test]
fn trend_ignores_input_order() {
    let start = day(2026, Month::March, 1);
    let mut points: Vec<(Date, f64)> = (0..6)
        .map(|i| (start + Duration::days(i), if i < 3 { 10.0 } else { 20.0 }))
        .collect();
    let forward = classify_trend(&points);
    points.reverse();
    assert_eq!(classify_trend(&points), forward);
    assert_eq!(forward, Trend::Up);
}

// =============================================================================
// Aggregation invariants
// =============================================================================

#[test]
fn lane_counts_sum_to_resolvable_shipments_and_are_sorted() {
    for seed in 0..32 {
        let shipments = generated_shipments(seed, 40);
        let lanes = aggregate_trade_lanes(&shipments);

        let resolvable = shipments
            .iter()
            .filter(|s| s.has_known_origin() && s.has_known_destination())
            .count() as u64;
        let lane_total: u64 = lanes.iter().map(|lane| lane.shipment_count).sum();
        assert_eq!(lane_total, resolvable, "seed {seed}");

        assert!(
            lanes
                .windows(2)
                .all(|pair| pair[0].shipment_count >= pair[1].shipment_count),
            "seed {seed}: lanes not sorted"
        );
    }
}

#[test]
fn market_shares_sum_to_one_hundred() {
    for seed in 0..32 {
        let shipments = generated_shipments(seed, 1 + seed as usize);
        let regions = aggregate_regions(&shipments);

        let total: f64 = regions.values().map(|region| region.market_share).sum();
        assert!((total - 100.0).abs() < 1e-9, "seed {seed}: total {total}");

        let counted: u64 = regions.values().map(|region| region.shipment_count).sum();
        assert_eq!(counted, shipments.len() as u64);
    }

    assert!(aggregate_regions(&[]).is_empty());
}

// =============================================================================
// Monthly buckets
// =============================================================================

#[test]
fn monthly_buckets_always_span_twelve_consecutive_months() {
    let todays = [
        day(2026, Month::January, 31),
        day(2026, Month::December, 1),
        day(2024, Month::February, 29),
    ];

    for today in todays {
        let buckets = monthly_buckets(&[], today);
        assert_eq!(buckets.len(), 12);
        assert_eq!(
            (buckets[11].year, buckets[11].month),
            (today.year(), u8::from(today.month()))
        );
        for pair in buckets.windows(2) {
            let previous = pair[0].year * 12 + i32::from(pair[0].month);
            let current = pair[1].year * 12 + i32::from(pair[1].month);
            assert_eq!(current - previous, 1);
        }
    }
}

#[test]
fn normalized_rows_feed_buckets_by_class() {
    let rows: Vec<RawShipmentRecord> = [
        json!({"container_type": "40ft FCL", "shipment_date": "2026-09-02"}),
        json!({"container_type": "LCL", "teu": "0.5", "shipment_date": "2026-09-03"}),
        json!({"container_type": "breakbulk", "shipment_date": "2026-09-04"}),
        json!({"container_type": "FCL", "shipment_date": "2024-01-01"}),
        json!({"container_type": "FCL", "shipment_date": "not a date"}),
    ]
    .into_iter()
    .map(RawShipmentRecord::from_value)
    .collect();

    let buckets = monthly_buckets(&normalize_all(&rows), day(2026, Month::September, 30));
    let september = &buckets[11];

    assert_eq!(september.shipments, 3);
    assert_eq!(september.fcl_volume, 2.0);
    assert_eq!(september.lcl_volume, 0.5);
    assert_eq!(buckets.iter().map(|b| b.shipments).sum::<u64>(), 3);
}
