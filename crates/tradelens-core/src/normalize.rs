//! Raw BOL row → [`NormalizedShipment`].
//!
//! Each canonical field resolves through a fixed, ordered list of raw keys;
//! the first key holding a non-empty value wins. Normalization is total:
//! anything missing or unmappable degrades to `"Unknown"`, `0` or `None`.
//!
//! | Field | Keys (in order) |
//! |-------|-----------------|
//! | origin port | `origin_port`, `port_of_lading`, `origin`, `origin_city` |
//! | origin country | `origin_country`, `country_of_origin`, `shipper_country` |
//! | destination port | `destination_port`, `port_of_unlading`, `destination`, `destination_city` |
//! | destination country | `destination_country`, `consignee_country` |
//! | container type | `container_type`, `containerType`, `load_type`, `container` |
//! | date | `shipment_date`, `arrival_date`, `bol_date`, `date` |
//! | supplier | `supplier`, `shipper_name`, `shipper` |
//! | teu | `teu`, `total_teu`, `teu_count` |
//! | containers | `containers`, `container_details` |
//! | mode | `mode`, `transport_mode`, `shipping_mode` |
//! | destination state | `destination_state`, `consignee_state`, `state` |
//! | destination address | `consignee_address`, `destination_address` |
//! | quantity | `shipment_count`, `shipments`, `quantity` |

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::domain::{ContainerClass, ContainerLine, NormalizedShipment, RawShipmentRecord, UNKNOWN};
use crate::metrics::{estimate_teu_from_containers, teu_multiplier};

pub const ORIGIN_PORT_KEYS: &[&str] = &["origin_port", "port_of_lading", "origin", "origin_city"];
pub const ORIGIN_COUNTRY_KEYS: &[&str] = &["origin_country", "country_of_origin", "shipper_country"];
pub const DESTINATION_PORT_KEYS: &[&str] = &[
    "destination_port",
    "port_of_unlading",
    "destination",
    "destination_city",
];
pub const DESTINATION_COUNTRY_KEYS: &[&str] = &["destination_country", "consignee_country"];
pub const CONTAINER_TYPE_KEYS: &[&str] = &["container_type", "containerType", "load_type", "container"];
pub const DATE_KEYS: &[&str] = &["shipment_date", "arrival_date", "bol_date", "date"];
pub const SUPPLIER_KEYS: &[&str] = &["supplier", "shipper_name", "shipper"];
pub const TEU_KEYS: &[&str] = &["teu", "total_teu", "teu_count"];
pub const CONTAINER_LIST_KEYS: &[&str] = &["containers", "container_details"];
pub const MODE_KEYS: &[&str] = &["mode", "transport_mode", "shipping_mode"];
pub const STATE_KEYS: &[&str] = &["destination_state", "consignee_state", "state"];
pub const ADDRESS_KEYS: &[&str] = &["consignee_address", "destination_address"];
pub const QUANTITY_KEYS: &[&str] = &["shipment_count", "shipments", "quantity"];

/// Normalize one record. Never fails.
pub fn normalize(record: &RawShipmentRecord) -> NormalizedShipment {
    let container_type = first_text(record, CONTAINER_TYPE_KEYS);
    let container_class = container_type
        .as_deref()
        .map(ContainerClass::from_container_type)
        .unwrap_or(ContainerClass::Unknown);

    let teu = resolve_teu(record, container_class, container_type.as_deref());

    NormalizedShipment {
        origin_port: text_or_unknown(record, ORIGIN_PORT_KEYS),
        origin_country: text_or_unknown(record, ORIGIN_COUNTRY_KEYS),
        destination_port: text_or_unknown(record, DESTINATION_PORT_KEYS),
        destination_country: text_or_unknown(record, DESTINATION_COUNTRY_KEYS),
        container_class,
        teu,
        shipment_date: first_text(record, DATE_KEYS).and_then(|raw| parse_date(&raw)),
        supplier: first_text(record, SUPPLIER_KEYS),
        mode: first_text(record, MODE_KEYS),
        destination_state: first_text(record, STATE_KEYS),
        destination_address: first_text(record, ADDRESS_KEYS),
        quantity: first_number(record, QUANTITY_KEYS).filter(|value| *value > 0.0),
    }
}

pub fn normalize_all(records: &[RawShipmentRecord]) -> Vec<NormalizedShipment> {
    records.iter().map(normalize).collect()
}

/// Parse the container breakdown list. Anything that is not a list yields nothing.
pub fn container_lines(value: &Value) -> Vec<ContainerLine> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let container_type = ["type", "container_type", "size"]
                .iter()
                .find_map(|key| item.get(*key).and_then(value_as_text))?;
            let count = ["count", "quantity", "qty"]
                .iter()
                .find_map(|key| item.get(*key).and_then(value_as_number))
                .unwrap_or(1.0);
            Some(ContainerLine::new(container_type, count.max(0.0)))
        })
        .collect()
}

/// Accepts `YYYY-MM-DD`, RFC3339, `YYYY-MM-DDTHH:MM:SS` and `MM/DD/YYYY`.
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed.date());
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(parsed.date());
    }
    if let Ok(parsed) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(parsed);
    }
    if let Ok(parsed) = Date::parse(raw, format_description!("[month]/[day]/[year]")) {
        return Some(parsed);
    }

    // `2024-03-05 10:00:00` and similar: fall back to the date prefix.
    raw.get(..10)
        .and_then(|prefix| Date::parse(prefix, format_description!("[year]-[month]-[day]")).ok())
}

fn resolve_teu(
    record: &RawShipmentRecord,
    container_class: ContainerClass,
    container_type: Option<&str>,
) -> f64 {
    if let Some(teu) = first_number(record, TEU_KEYS).filter(|teu| *teu > 0.0) {
        return teu;
    }

    let lines = CONTAINER_LIST_KEYS
        .iter()
        .find_map(|key| record.field(key).filter(|value| value.is_array()))
        .map(container_lines)
        .unwrap_or_default();
    if !lines.is_empty() {
        return estimate_teu_from_containers(&lines) as f64;
    }

    match (container_class, container_type) {
        (ContainerClass::Fcl, Some(container_type)) => teu_multiplier(container_type),
        _ => 0.0,
    }
}

fn text_or_unknown(record: &RawShipmentRecord, keys: &[&str]) -> String {
    first_text(record, keys).unwrap_or_else(|| UNKNOWN.to_owned())
}

fn first_text(record: &RawShipmentRecord, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| record.field(key).and_then(value_as_text))
}

fn first_number(record: &RawShipmentRecord, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| record.field(key).and_then(value_as_number))
}

fn value_as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn value_as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
