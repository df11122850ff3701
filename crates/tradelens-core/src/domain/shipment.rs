use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::Date;

/// Placeholder used for every port/country that no source field supplies.
pub const UNKNOWN: &str = "Unknown";

/// One bill-of-lading row exactly as the gateway returned it.
///
/// The same concept may appear under several keys; see [`crate::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawShipmentRecord(Map<String, Value>);

impl RawShipmentRecord {
    /// Wrap a JSON value. Non-object values become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Container load class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerClass {
    Fcl,
    Lcl,
    Unknown,
}

impl ContainerClass {
    /// Classify free text: `fcl` wins over `lcl`, anything else is unknown.
    pub fn from_container_type(raw: &str) -> Self {
        let lowered = raw.to_ascii_lowercase();
        if lowered.contains("fcl") {
            Self::Fcl
        } else if lowered.contains("lcl") {
            Self::Lcl
        } else {
            Self::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fcl => "FCL",
            Self::Lcl => "LCL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for ContainerClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a container breakdown, e.g. `{ "type": "40HC", "count": 3 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerLine {
    #[serde(rename = "type")]
    pub container_type: String,
    pub count: f64,
}

impl ContainerLine {
    pub fn new(container_type: impl Into<String>, count: f64) -> Self {
        Self {
            container_type: container_type.into(),
            count,
        }
    }
}

/// Canonical shipment shape consumed by every calculator and aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedShipment {
    pub origin_port: String,
    pub origin_country: String,
    pub destination_port: String,
    pub destination_country: String,
    pub container_class: ContainerClass,
    pub teu: f64,
    pub shipment_date: Option<Date>,
    pub supplier: Option<String>,
    /// Transport mode text as reported (`"Ocean"`, `"AIR FREIGHT"`, ...).
    pub mode: Option<String>,
    /// Explicit destination state hint, if the record carried one.
    pub destination_state: Option<String>,
    pub destination_address: Option<String>,
    /// Shipment count carried by pre-aggregated rows; `None` for plain BOL rows.
    pub quantity: Option<f64>,
}

impl NormalizedShipment {
    /// A shipment with every field at its "absent" value.
    pub fn unknown() -> Self {
        Self {
            origin_port: UNKNOWN.to_owned(),
            origin_country: UNKNOWN.to_owned(),
            destination_port: UNKNOWN.to_owned(),
            destination_country: UNKNOWN.to_owned(),
            container_class: ContainerClass::Unknown,
            teu: 0.0,
            shipment_date: None,
            supplier: None,
            mode: None,
            destination_state: None,
            destination_address: None,
            quantity: None,
        }
    }

    pub fn has_known_origin(&self) -> bool {
        self.origin_port != UNKNOWN || self.origin_country != UNKNOWN
    }

    pub fn has_known_destination(&self) -> bool {
        self.destination_port != UNKNOWN || self.destination_country != UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn container_class_prefers_fcl_then_lcl() {
        assert_eq!(ContainerClass::from_container_type("40ft FCL"), ContainerClass::Fcl);
        assert_eq!(ContainerClass::from_container_type("lcl consol"), ContainerClass::Lcl);
        assert_eq!(ContainerClass::from_container_type("FCL/LCL"), ContainerClass::Fcl);
        assert_eq!(ContainerClass::from_container_type("reefer"), ContainerClass::Unknown);
        assert_eq!(ContainerClass::from_container_type(""), ContainerClass::Unknown);
    }

    #[test]
    fn non_object_json_becomes_empty_record() {
        let record = RawShipmentRecord::from_value(json!([1, 2, 3]));
        assert_eq!(record, RawShipmentRecord::default());
    }

    #[test]
    fn container_line_uses_type_key_on_the_wire() {
        let line: ContainerLine =
            serde_json::from_value(json!({"type": "20GP", "count": 2})).expect("parse");
        assert_eq!(line, ContainerLine::new("20GP", 2.0));
    }
}
