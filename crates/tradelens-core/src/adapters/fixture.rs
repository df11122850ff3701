use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::data_source::{ShipmentPage, ShipmentQuery, ShipmentSource, SourceError};
use crate::normalize::normalize;
use crate::RawShipmentRecord;

/// In-memory source keyed by company id.
///
/// Companies marked failing return a [`SourceError`]; companies marked
/// declined return `ok: false`. Unknown companies return an empty `ok` page.
#[derive(Debug, Default)]
pub struct StaticShipmentSource {
    records: HashMap<String, Vec<RawShipmentRecord>>,
    failing: HashSet<String>,
    declined: HashSet<String>,
    calls: AtomicUsize,
}

impl StaticShipmentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object mapping company id to an array of raw rows.
    pub fn from_json(value: Value) -> Result<Self, SourceError> {
        let Value::Object(companies) = value else {
            return Err(SourceError::invalid_request(
                "fixture must be a JSON object keyed by company id",
            ));
        };

        let mut source = Self::new();
        for (company_id, rows) in companies {
            let Value::Array(rows) = rows else {
                return Err(SourceError::invalid_request(format!(
                    "fixture rows for '{company_id}' must be an array"
                )));
            };
            source = source.with_company(
                company_id,
                rows.into_iter().map(RawShipmentRecord::from_value).collect(),
            );
        }
        Ok(source)
    }

    pub fn with_company(mut self, company_id: impl Into<String>, rows: Vec<RawShipmentRecord>) -> Self {
        self.records.insert(company_id.into(), rows);
        self
    }

    pub fn with_failure(mut self, company_id: impl Into<String>) -> Self {
        self.failing.insert(company_id.into());
        self
    }

    pub fn with_declined(mut self, company_id: impl Into<String>) -> Self {
        self.declined.insert(company_id.into());
        self
    }

    /// Number of `fetch_shipments` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn page_for(&self, query: &ShipmentQuery) -> Result<ShipmentPage, SourceError> {
        let company_id = query.company_id.as_str();
        if self.failing.contains(company_id) {
            return Err(SourceError::unavailable(format!(
                "fixture source configured to fail for '{company_id}'"
            )));
        }
        if self.declined.contains(company_id) {
            return Ok(ShipmentPage::declined());
        }

        let rows = self
            .records
            .get(company_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|row| match query.date_range {
                Some(range) => normalize(row)
                    .shipment_date
                    .is_some_and(|date| range.contains(date)),
                None => true,
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();

        Ok(ShipmentPage::ok(rows))
    }
}

impl ShipmentSource for StaticShipmentSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn fetch_shipments<'a>(
        &'a self,
        query: ShipmentQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ShipmentPage, SourceError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let page = self.page_for(&query);
        Box::pin(async move { page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::DateRange;
    use crate::CompanyId;
    use serde_json::json;
    use time::macros::date;

    fn query(id: &str, limit: usize) -> ShipmentQuery {
        ShipmentQuery::new(CompanyId::parse(id).expect("valid"), limit).expect("valid query")
    }

    #[tokio::test]
    async fn serves_rows_with_limit_and_counts_calls() {
        let source = StaticShipmentSource::from_json(json!({
            "acme": [{"shipment_date": "2026-01-01"}, {"shipment_date": "2026-02-01"}, {}]
        }))
        .expect("fixture");

        let page = source.fetch_shipments(query("acme", 2)).await.expect("page");
        assert!(page.ok);
        assert_eq!(page.rows.len(), 2);

        let unknown = source.fetch_shipments(query("globex", 10)).await.expect("page");
        assert!(unknown.ok);
        assert!(unknown.rows.is_empty());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn date_range_filters_on_normalized_date() {
        let source = StaticShipmentSource::from_json(json!({
            "acme": [
                {"shipment_date": "2026-01-15"},
                {"arrival_date": "03/10/2026"},
                {"shipment_date": "2026-05-01"},
                {}
            ]
        }))
        .expect("fixture");

        let range = DateRange::between(date!(2026 - 01 - 01), date!(2026 - 03 - 31)).expect("range");
        let page = source
            .fetch_shipments(query("acme", 500).with_date_range(Some(range)))
            .await
            .expect("page");
        assert_eq!(page.rows.len(), 2);
    }

    #[tokio::test]
    async fn failing_and_declined_companies() {
        let source = StaticShipmentSource::new()
            .with_failure("broken")
            .with_declined("private");

        assert!(source.fetch_shipments(query("broken", 5)).await.is_err());
        let declined = source.fetch_shipments(query("private", 5)).await.expect("page");
        assert!(!declined.ok);
    }

    #[test]
    fn rejects_non_object_fixtures() {
        assert!(StaticShipmentSource::from_json(json!([])).is_err());
        assert!(StaticShipmentSource::from_json(json!({"acme": {}})).is_err());
    }
}
