use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::EnrichmentResult;

/// Outcome of a batch run: one entry per distinct company id, in the order
/// the ids were first supplied. `None` means no data for that company.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    entries: Vec<(String, Option<EnrichmentResult>)>,
}

impl BatchReport {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Record an outcome. A repeated id keeps its original position and takes
    /// the newer outcome.
    pub fn insert(&mut self, company_id: impl Into<String>, outcome: Option<EnrichmentResult>) {
        let company_id = company_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == company_id) {
            Some((_, existing)) => *existing = outcome,
            None => self.entries.push((company_id, outcome)),
        }
    }

    pub fn get(&self, company_id: &str) -> Option<&EnrichmentResult> {
        self.entries
            .iter()
            .find(|(id, _)| id == company_id)
            .and_then(|(_, outcome)| outcome.as_ref())
    }

    /// True when the id was part of the batch, with or without data.
    pub fn contains(&self, company_id: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == company_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&EnrichmentResult>)> {
        self.entries
            .iter()
            .map(|(id, outcome)| (id.as_str(), outcome.as_ref()))
    }

    pub fn enriched_count(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_some()).count()
    }

    /// Ids that came back without data, in batch order.
    pub fn empty_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.is_none())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Serializes as a JSON object in batch order, `null` for empty entries.
impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, outcome) in &self.entries {
            map.serialize_entry(id, outcome)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompanyId, TeuBasis, Trend, UtcDateTime};
    use std::collections::BTreeMap;

    fn result(id: &str, shipments: u64) -> EnrichmentResult {
        EnrichmentResult {
            company_id: CompanyId::parse(id).expect("valid"),
            shipment_count: shipments,
            teu_estimate: 0,
            teu_basis: TeuBasis::None,
            fcl_count: 0,
            lcl_count: 0,
            primary_mode: None,
            trend: Trend::Flat,
            trade_lanes: Vec::new(),
            regions: BTreeMap::new(),
            computed_at: UtcDateTime::from_unix_millis(0),
        }
    }

    #[test]
    fn preserves_order_and_distinguishes_empty_from_absent() {
        let mut report = BatchReport::default();
        report.insert("a", Some(result("a", 1)));
        report.insert("b", None);
        report.insert("c", Some(result("c", 3)));

        let ids: Vec<&str> = report.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(report.get("b").is_none());
        assert!(report.contains("b"));
        assert!(!report.contains("z"));
        assert_eq!(report.enriched_count(), 2);
        assert_eq!(report.empty_ids(), vec!["b"]);
    }

    #[test]
    fn repeated_id_keeps_first_position() {
        let mut report = BatchReport::default();
        report.insert("a", None);
        report.insert("b", None);
        report.insert("a", Some(result("a", 9)));

        assert_eq!(report.len(), 2);
        assert_eq!(report.iter().next().map(|(id, _)| id), Some("a"));
        assert_eq!(report.get("a").map(|r| r.shipment_count), Some(9));
    }

    #[test]
    fn serializes_as_ordered_object() {
        let mut report = BatchReport::default();
        report.insert("z", None);
        report.insert("a", None);

        let json = serde_json::to_string(&report).expect("serialize");
        assert_eq!(json, r#"{"z":null,"a":null}"#);
    }
}
