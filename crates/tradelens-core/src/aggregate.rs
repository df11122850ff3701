//! Trade lane and regional aggregation.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{ContainerClass, NormalizedShipment, Region, RegionalBreakdown, TradeLane};
use crate::regions::resolve_region;

const REGION_SUPPLIER_CAP: usize = 5;

type LaneKey<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Group shipments by `(origin port, origin country, destination port,
/// destination country)`.
///
/// Shipments without a resolvable origin or destination are skipped. Lanes
/// come back sorted by descending shipment count; ties keep the order in
/// which each lane was first seen.
pub fn aggregate_trade_lanes(shipments: &[NormalizedShipment]) -> Vec<TradeLane> {
    let mut lanes: Vec<TradeLane> = Vec::new();
    let mut supplier_sets: Vec<HashSet<String>> = Vec::new();
    let mut index: HashMap<LaneKey<'_>, usize> = HashMap::new();

    for shipment in shipments {
        if !shipment.has_known_origin() || !shipment.has_known_destination() {
            continue;
        }

        let key = (
            shipment.origin_port.as_str(),
            shipment.origin_country.as_str(),
            shipment.destination_port.as_str(),
            shipment.destination_country.as_str(),
        );
        let position = *index.entry(key).or_insert_with(|| {
            lanes.push(TradeLane {
                origin_port: shipment.origin_port.clone(),
                origin_country: shipment.origin_country.clone(),
                destination_port: shipment.destination_port.clone(),
                destination_country: shipment.destination_country.clone(),
                shipment_count: 0,
                teu: 0.0,
                fcl_count: 0,
                lcl_count: 0,
                suppliers: Vec::new(),
                last_shipment_date: None,
            });
            supplier_sets.push(HashSet::new());
            lanes.len() - 1
        });

        let lane = &mut lanes[position];
        lane.shipment_count += 1;
        lane.teu += shipment.teu;
        match shipment.container_class {
            ContainerClass::Fcl => lane.fcl_count += 1,
            ContainerClass::Lcl => lane.lcl_count += 1,
            ContainerClass::Unknown => {}
        }

        if let Some(supplier) = shipment.supplier.as_deref().filter(|s| !s.is_empty()) {
            if supplier_sets[position].insert(supplier.to_owned()) {
                lane.suppliers.push(supplier.to_owned());
            }
        }

        if shipment.shipment_date > lane.last_shipment_date {
            lane.last_shipment_date = shipment.shipment_date;
        }
    }

    lanes.sort_by(|a, b| b.shipment_count.cmp(&a.shipment_count));
    lanes
}

/// Per-region totals with market share over the whole shipment set.
///
/// Every shipment lands in exactly one region (unresolvable ones in
/// [`Region::Other`]), so shares sum to 100 whenever the input is non-empty.
pub fn aggregate_regions(shipments: &[NormalizedShipment]) -> BTreeMap<Region, RegionalBreakdown> {
    let mut regions: BTreeMap<Region, RegionalBreakdown> = BTreeMap::new();
    if shipments.is_empty() {
        return regions;
    }

    for shipment in shipments {
        let region = resolve_region(shipment);
        let breakdown = regions.entry(region).or_insert_with(|| RegionalBreakdown {
            region,
            shipment_count: 0,
            fcl_count: 0,
            lcl_count: 0,
            market_share: 0.0,
            top_suppliers: Vec::new(),
        });

        breakdown.shipment_count += 1;
        match shipment.container_class {
            ContainerClass::Fcl => breakdown.fcl_count += 1,
            ContainerClass::Lcl => breakdown.lcl_count += 1,
            ContainerClass::Unknown => {}
        }

        if let Some(supplier) = shipment.supplier.as_deref().filter(|s| !s.is_empty()) {
            if breakdown.top_suppliers.len() < REGION_SUPPLIER_CAP
                && !breakdown.top_suppliers.iter().any(|known| known == supplier)
            {
                breakdown.top_suppliers.push(supplier.to_owned());
            }
        }
    }

    let total = shipments.len() as f64;
    for breakdown in regions.values_mut() {
        breakdown.market_share = breakdown.shipment_count as f64 / total * 100.0;
    }

    regions
}
