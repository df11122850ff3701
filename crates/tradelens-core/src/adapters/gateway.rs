use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::data_source::{ShipmentPage, ShipmentQuery, ShipmentSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient, ReqwestHttpClient};
use crate::RawShipmentRecord;

const SHIPMENTS_PATH: &str = "shipments";
const GATEWAY_TIMEOUT_MS: u64 = 10_000;

/// Remote BOL gateway reached over HTTP.
///
/// Issues exactly one GET per query; pagination and retries are the caller's
/// business.
#[derive(Clone)]
pub struct GatewaySource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
}

impl GatewaySource {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), base_url, api_key)
    }

    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let auth = match api_key {
            Some(key) if !key.trim().is_empty() => HttpAuth::BearerToken(key),
            _ => HttpAuth::None,
        };
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth,
        }
    }

    /// Never touches the network; every company comes back empty.
    pub fn offline() -> Self {
        Self::with_http_client(Arc::new(NoopHttpClient), "http://offline.invalid", None)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn shipments_url(&self, query: &ShipmentQuery) -> String {
        let mut url = format!(
            "{}/{SHIPMENTS_PATH}?company_id={}&limit={}&offset={}",
            self.base_url,
            urlencoding::encode(query.company_id.as_str()),
            query.limit,
            query.offset,
        );
        // Open bounds are left off the query string.
        let range = query.date_range.unwrap_or_default();
        for (param, bound) in [("start_date", range.start), ("end_date", range.end)] {
            if let Some(date) = bound {
                url.push_str(&format!("&{param}={}", urlencoding::encode(&date.to_string())));
            }
        }
        url
    }

    async fn fetch(&self, query: ShipmentQuery) -> Result<ShipmentPage, SourceError> {
        let url = self.shipments_url(&query);
        debug!(company_id = %query.company_id, %url, "requesting shipments from gateway");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout_ms(GATEWAY_TIMEOUT_MS);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("gateway transport error: {}", e.message()))
        })?;

        match response.status {
            401 | 403 => {
                return Err(SourceError::unauthorized(format!(
                    "gateway rejected credentials with status {}",
                    response.status
                )))
            }
            _ if !response.is_success() => {
                return Err(SourceError::unavailable(format!(
                    "gateway returned status {}",
                    response.status
                )))
            }
            _ => {}
        }

        parse_page(&response.body)
    }
}

impl ShipmentSource for GatewaySource {
    fn name(&self) -> &'static str {
        "gateway"
    }

    fn fetch_shipments<'a>(
        &'a self,
        query: ShipmentQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ShipmentPage, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch(query))
    }
}

/// Either `{ok, rows}` or the older `{success, data}` envelope.
#[derive(Debug, Deserialize)]
struct GatewayEnvelope {
    ok: Option<bool>,
    success: Option<bool>,
    rows: Option<Value>,
    data: Option<Value>,
}

fn parse_page(body: &str) -> Result<ShipmentPage, SourceError> {
    let envelope: GatewayEnvelope = serde_json::from_str(body).map_err(|e| {
        SourceError::invalid_response(format!("gateway body is not a shipment envelope: {e}"))
    })?;

    let rows: Vec<RawShipmentRecord> = match envelope.rows.or(envelope.data) {
        Some(Value::Array(items)) => items.into_iter().map(RawShipmentRecord::from_value).collect(),
        _ => Vec::new(),
    };

    // Without a flag, a body that carries rows is an answer.
    let ok = envelope
        .ok
        .or(envelope.success)
        .unwrap_or(!rows.is_empty());

    Ok(ShipmentPage { ok, rows })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::data_source::{DateRange, SourceErrorKind};
    use crate::http_client::{HttpError, HttpResponse};
    use crate::CompanyId;
    use time::macros::date;

    struct CannedHttpClient {
        response: Result<HttpResponse, HttpError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        fn new(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().expect("lock poisoned").clone()
        }
    }

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.seen.lock().expect("lock poisoned").push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn query(id: &str) -> ShipmentQuery {
        ShipmentQuery::new(CompanyId::parse(id).expect("valid"), 500).expect("valid query")
    }

    #[tokio::test]
    async fn builds_encoded_url_with_bearer_token() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(r#"{"ok":true,"rows":[]}"#)));
        let source = GatewaySource::with_http_client(
            client.clone(),
            "https://gateway.test/api/",
            Some("secret".to_owned()),
        );

        let range = DateRange::between(date!(2026 - 01 - 01), date!(2026 - 06 - 30)).expect("range");
        source
            .fetch_shipments(query("acme:us").with_date_range(Some(range)))
            .await
            .expect("page");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://gateway.test/api/shipments?company_id=acme%3Aus&limit=500&offset=0\
             &start_date=2026-01-01&end_date=2026-06-30"
        );
        assert_eq!(
            requests[0].headers.get("authorization").map(String::as_str),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn accepts_both_envelope_shapes() {
        let current = parse_page(r#"{"ok":true,"rows":[{"origin_port":"Busan"}]}"#).expect("page");
        assert!(current.ok);
        assert_eq!(current.rows.len(), 1);

        let legacy = parse_page(r#"{"success":true,"data":[{"a":1},{"b":2}]}"#).expect("page");
        assert!(legacy.ok);
        assert_eq!(legacy.rows.len(), 2);

        let missing_rows = parse_page(r#"{"ok":true}"#).expect("page");
        assert!(missing_rows.rows.is_empty());
    }

    #[test]
    fn missing_flag_follows_rows_and_ok_wins_over_success() {
        let unflagged = parse_page(r#"{"rows":[{"origin_port":"Busan"}]}"#).expect("page");
        assert!(unflagged.ok);
        assert_eq!(unflagged.rows.len(), 1);

        let empty = parse_page(r#"{"rows":[]}"#).expect("page");
        assert!(!empty.ok);

        let both = parse_page(r#"{"ok":false,"success":true,"rows":[{"a":1}],"data":[]}"#)
            .expect("both flags parse");
        assert!(!both.ok);
        assert_eq!(both.rows.len(), 1);
    }

    #[tokio::test]
    async fn open_range_bounds_are_left_off_the_url() {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(r#"{"ok":true,"rows":[]}"#)));
        let source =
            GatewaySource::with_http_client(client.clone(), "https://gateway.test", None);

        let until = DateRange::new(None, Some(date!(2026 - 06 - 30))).expect("open start");
        let from = DateRange::new(Some(date!(2026 - 01 - 01)), None).expect("open end");
        for range in [until, from] {
            source
                .fetch_shipments(query("acme").with_date_range(Some(range)))
                .await
                .expect("page");
        }

        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://gateway.test/shipments?company_id=acme&limit=500&offset=0&end_date=2026-06-30",
                "https://gateway.test/shipments?company_id=acme&limit=500&offset=0&start_date=2026-01-01",
            ]
        );
    }

    #[tokio::test]
    async fn maps_status_codes_to_error_kinds() {
        let unauthorized = GatewaySource::with_http_client(
            CannedHttpClient::new(Ok(HttpResponse {
                status: 401,
                body: String::new(),
            })),
            "https://gateway.test",
            None,
        );
        let error = unauthorized
            .fetch_shipments(query("acme"))
            .await
            .expect_err("401 is an error");
        assert_eq!(error.kind(), SourceErrorKind::Unauthorized);

        let down = GatewaySource::with_http_client(
            CannedHttpClient::new(Err(HttpError::new("connection refused"))),
            "https://gateway.test",
            None,
        );
        let error = down.fetch_shipments(query("acme")).await.expect_err("transport");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let source = GatewaySource::with_http_client(
            CannedHttpClient::new(Ok(HttpResponse::ok_json("<html>"))),
            "https://gateway.test",
            None,
        );
        let error = source.fetch_shipments(query("acme")).await.expect_err("html");
        assert_eq!(error.kind(), SourceErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn offline_source_returns_empty_ok_page() {
        let page = GatewaySource::offline()
            .fetch_shipments(query("acme"))
            .await
            .expect("page");
        assert!(page.ok);
        assert!(page.rows.is_empty());
    }
}
