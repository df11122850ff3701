//! Assembles result documents from a normalized shipment set.

use crate::aggregate::{aggregate_regions, aggregate_trade_lanes};
use crate::metrics::{
    classify_primary_mode, count_container_classes, last_shipment_date, monthly_buckets,
    shipment_trend, top_ports, total_teu, PortSide, TOP_PORTS,
};
use crate::{CompanyId, EnrichmentResult, KpiView, NormalizedShipment, UtcDateTime};

/// Full enrichment: metrics plus lane and region aggregation.
///
/// `primary_mode` is absent when no shipment reports a transport mode.
pub fn build_enrichment_result(
    company_id: CompanyId,
    shipments: &[NormalizedShipment],
    computed_at: UtcDateTime,
) -> EnrichmentResult {
    let (teu_estimate, teu_basis) = total_teu(shipments);
    let (fcl_count, lcl_count) = count_container_classes(shipments);
    let primary_mode = shipments
        .iter()
        .any(|shipment| shipment.mode.is_some())
        .then(|| classify_primary_mode(shipments));

    EnrichmentResult {
        company_id,
        shipment_count: shipments.len() as u64,
        teu_estimate,
        teu_basis,
        fcl_count,
        lcl_count,
        primary_mode,
        trend: shipment_trend(shipments),
        trade_lanes: aggregate_trade_lanes(shipments),
        regions: aggregate_regions(shipments),
        computed_at,
    }
}

/// KPI projection. The monthly window ends at the month of `computed_at`.
pub fn build_kpi_view(
    company_id: CompanyId,
    shipments: &[NormalizedShipment],
    computed_at: UtcDateTime,
) -> KpiView {
    let (teu_estimate, teu_basis) = total_teu(shipments);
    let (fcl_count, lcl_count) = count_container_classes(shipments);

    KpiView {
        company_id,
        shipment_count: shipments.len() as u64,
        teu_estimate,
        teu_basis,
        fcl_count,
        lcl_count,
        trend: shipment_trend(shipments),
        top_origin_ports: top_ports(shipments, PortSide::Origin, TOP_PORTS),
        top_destination_ports: top_ports(shipments, PortSide::Destination, TOP_PORTS),
        monthly_volume: monthly_buckets(shipments, computed_at.date()),
        last_shipment_date: last_shipment_date(shipments),
        computed_at,
    }
}
