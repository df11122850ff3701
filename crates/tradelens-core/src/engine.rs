//! Cache-aware enrichment entry points.
//!
//! Every public operation validates the company id first; that is the only
//! failure surfaced as an `Err`. Upstream trouble (transport errors, a
//! declined request, an empty page) is logged and becomes `Ok(None)`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::batch::BatchReport;
use crate::builder::{build_enrichment_result, build_kpi_view};
use crate::cache::{CacheKind, CacheManager};
use crate::config::EngineConfig;
use crate::data_source::{DateRange, ShipmentQuery, ShipmentSource, DEFAULT_FETCH_LIMIT};
use crate::normalize::normalize_all;
use crate::pacing::Pacing;
use crate::{CompanyId, EnrichmentResult, KpiView, NormalizedShipment, ValidationError};

/// Progress callback for batch runs: `(completed, total)`.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(usize, usize) + Send);

pub struct EnrichmentEngine {
    source: Arc<dyn ShipmentSource>,
    cache: Arc<CacheManager>,
    fetch_limit: usize,
    date_range: Option<DateRange>,
    pacing: Pacing,
}

impl EnrichmentEngine {
    pub fn new(source: Arc<dyn ShipmentSource>, cache: CacheManager) -> Self {
        Self {
            source,
            cache: Arc::new(cache),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            date_range: None,
            pacing: Pacing::default(),
        }
    }

    /// Fetch limit, date range and pacing taken from `config`.
    pub fn from_config(
        config: &EngineConfig,
        source: Arc<dyn ShipmentSource>,
        cache: CacheManager,
    ) -> Self {
        Self::new(source, cache)
            .with_fetch_limit(config.fetch_limit)
            .with_date_range(config.date_range)
            .with_pacing(config.pacing)
    }

    pub fn with_fetch_limit(mut self, fetch_limit: usize) -> Self {
        self.fetch_limit = fetch_limit.max(1);
        self
    }

    pub fn with_date_range(mut self, date_range: Option<DateRange>) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Enrichment for one company, served from cache when fresh.
    pub async fn enrich_company(
        &self,
        company_id: &str,
    ) -> Result<Option<EnrichmentResult>, ValidationError> {
        let company_id = CompanyId::parse(company_id)?;

        if let Some(cached) = self.cached::<EnrichmentResult>(CacheKind::Enrichment, &company_id).await {
            return Ok(Some(cached));
        }

        let Some(shipments) = self.fetch_normalized(&company_id).await else {
            return Ok(None);
        };

        let result = build_enrichment_result(company_id.clone(), &shipments, self.cache.now());
        info!(
            company_id = %company_id,
            shipments = result.shipment_count,
            lanes = result.trade_lanes.len(),
            "company enriched"
        );
        self.store(CacheKind::Enrichment, &company_id, result.clone()).await;
        Ok(Some(result))
    }

    /// KPI-only projection, cached separately from full enrichment.
    pub async fn compute_kpis(&self, company_id: &str) -> Result<Option<KpiView>, ValidationError> {
        let company_id = CompanyId::parse(company_id)?;

        if let Some(cached) = self.cached::<KpiView>(CacheKind::Kpi, &company_id).await {
            return Ok(Some(cached));
        }

        let Some(shipments) = self.fetch_normalized(&company_id).await else {
            return Ok(None);
        };

        let view = build_kpi_view(company_id.clone(), &shipments, self.cache.now());
        info!(company_id = %company_id, shipments = view.shipment_count, "kpis computed");
        self.store(CacheKind::Kpi, &company_id, view.clone()).await;
        Ok(Some(view))
    }

    /// Enrich companies one at a time, in order.
    ///
    /// A company with no data, or an id that fails validation, is recorded as
    /// `None` and the run continues. The callback fires after every company.
    /// The pacing delay sits between companies, never after the last one.
    pub async fn batch_enrich_companies(
        &self,
        company_ids: &[String],
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> BatchReport {
        let total = company_ids.len();
        let mut report = BatchReport::with_capacity(total);
        let mut consecutive_misses = 0u32;

        info!(total, "batch enrichment started");

        for (position, company_id) in company_ids.iter().enumerate() {
            let outcome = match self.enrich_company(company_id).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(company_id = %company_id, %error, "skipping invalid company id");
                    None
                }
            };

            consecutive_misses = if outcome.is_some() {
                0
            } else {
                consecutive_misses.saturating_add(1)
            };
            report.insert(company_id.clone(), outcome);

            let completed = position + 1;
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(completed, total);
            }

            if completed < total {
                let delay = self.pacing.delay(consecutive_misses);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        info!(
            total,
            enriched = report.enriched_count(),
            "batch enrichment finished"
        );
        report
    }

    /// Drop every cached enrichment and KPI view from both tiers.
    pub fn clear_enrichment_cache(&self) {
        self.cache.clear();
        info!("enrichment cache cleared");
    }

    /// Cache read on the blocking pool; the persisted tier does file I/O.
    async fn cached<T>(&self, kind: CacheKind, company_id: &CompanyId) -> Option<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        let company_id = company_id.clone();
        match tokio::task::spawn_blocking(move || cache.get::<T>(kind, &company_id)).await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, kind = kind.as_str(), "cache read task failed");
                None
            }
        }
    }

    async fn store<T>(&self, kind: CacheKind, company_id: &CompanyId, value: T)
    where
        T: Serialize + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        let company_id = company_id.clone();
        let write = tokio::task::spawn_blocking(move || cache.put(kind, &company_id, &value));
        if let Err(error) = write.await {
            warn!(%error, kind = kind.as_str(), "cache write task failed");
        }
    }

    /// One bounded fetch, normalized. `None` when there is nothing to build from.
    async fn fetch_normalized(&self, company_id: &CompanyId) -> Option<Vec<NormalizedShipment>> {
        let query = match ShipmentQuery::new(company_id.clone(), self.fetch_limit) {
            Ok(query) => query.with_date_range(self.date_range),
            Err(error) => {
                warn!(company_id = %company_id, %error, "could not build shipment query");
                return None;
            }
        };

        let page = match self.source.fetch_shipments(query).await {
            Ok(page) => page,
            Err(error) => {
                warn!(
                    company_id = %company_id,
                    source = self.source.name(),
                    code = error.code(),
                    %error,
                    "shipment fetch failed"
                );
                return None;
            }
        };

        if !page.ok {
            warn!(company_id = %company_id, source = self.source.name(), "source declined request");
            return None;
        }
        if page.rows.is_empty() {
            debug!(company_id = %company_id, source = self.source.name(), "no shipments returned");
            return None;
        }

        Some(normalize_all(&page.rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticShipmentSource;
    use crate::clock::ManualClock;
    use crate::UtcDateTime;
    use serde_json::json;
    use std::time::Duration;

    fn engine_with(source: StaticShipmentSource) -> (EnrichmentEngine, Arc<StaticShipmentSource>) {
        let source = Arc::new(source);
        let clock = Arc::new(ManualClock::new(UtcDateTime::from_unix_millis(1_780_000_000_000)));
        let engine = EnrichmentEngine::new(source.clone(), CacheManager::memory_only(clock))
            .with_pacing(Pacing::fixed(Duration::ZERO));
        (engine, source)
    }

    fn fixture() -> StaticShipmentSource {
        StaticShipmentSource::from_json(json!({
            "acme": [
                {"origin_port": "Ningbo", "destination_port": "Savannah", "container_type": "40ft FCL"},
                {"origin_port": "Ningbo", "destination_port": "Savannah", "container_type": "LCL"}
            ]
        }))
        .expect("fixture")
    }

    #[tokio::test]
    async fn invalid_id_is_the_only_error() {
        let (engine, source) = engine_with(fixture());
        assert!(matches!(
            engine.enrich_company("   ").await,
            Err(ValidationError::EmptyCompanyId)
        ));
        assert!(engine.compute_kpis("bad id!").await.is_err());
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_failing_and_declined_companies_are_none() {
        let (engine, _) = engine_with(fixture().with_failure("broken").with_declined("private"));

        assert_eq!(engine.enrich_company("nobody").await, Ok(None));
        assert_eq!(engine.enrich_company("broken").await, Ok(None));
        assert_eq!(engine.enrich_company("private").await, Ok(None));
    }

    #[tokio::test]
    async fn enrichment_and_kpis_are_cached_independently() {
        let (engine, source) = engine_with(fixture());

        let result = engine.enrich_company("acme").await.expect("valid").expect("data");
        assert_eq!(result.fcl_count, 1);
        assert_eq!(result.teu_estimate, 2);

        engine.compute_kpis("acme").await.expect("valid").expect("data");
        assert_eq!(source.call_count(), 2);

        engine.enrich_company("acme").await.expect("valid");
        engine.compute_kpis("acme").await.expect("valid");
        assert_eq!(source.call_count(), 2);

        engine.clear_enrichment_cache();
        engine.compute_kpis("acme").await.expect("valid");
        assert_eq!(source.call_count(), 3);
    }

    #[tokio::test]
    async fn batch_records_invalid_ids_as_empty() {
        let (engine, _) = engine_with(fixture());
        let ids = vec!["acme".to_owned(), "no spaces allowed".to_owned()];

        let mut calls = Vec::new();
        let mut progress = |done: usize, total: usize| calls.push((done, total));
        let report = engine.batch_enrich_companies(&ids, Some(&mut progress)).await;

        assert_eq!(calls, vec![(1, 2), (2, 2)]);
        assert!(report.get("acme").is_some());
        assert!(report.contains("no spaces allowed"));
        assert!(report.get("no spaces allowed").is_none());
    }

    #[tokio::test]
    async fn adaptive_pacing_widens_after_consecutive_empty_results() {
        let (engine, _) = engine_with(fixture());
        let engine = engine.with_pacing(Pacing::Adaptive {
            base: Duration::from_millis(10),
            factor: 4.0,
            max: Duration::from_secs(1),
            jitter: false,
        });
        let ids = vec!["nobody".to_owned(), "no-one".to_owned(), "acme".to_owned()];

        // 40ms after the first miss, 160ms after the second.
        let started = std::time::Instant::now();
        let report = engine.batch_enrich_companies(&ids, None).await;
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(report.enriched_count(), 1);
    }

    #[tokio::test]
    async fn empty_batch_never_calls_back() {
        let (engine, _) = engine_with(fixture());
        let mut called = false;
        let mut progress = |_: usize, _: usize| called = true;

        let report = engine.batch_enrich_companies(&[], Some(&mut progress)).await;
        assert!(report.is_empty());
        assert!(!called);
    }
}
