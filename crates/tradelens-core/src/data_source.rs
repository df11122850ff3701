//! Shipment source contract and its request/response types.
//!
//! | Type | Role |
//! |------|------|
//! | [`ShipmentQuery`] | One bounded page request for a company |
//! | [`ShipmentPage`] | Upstream answer: `ok` flag plus raw rows |
//! | [`ShipmentSource`] | Adapter trait implemented by the gateway and fixture sources |
//! | [`SourceError`] | Structured failure with a stable code |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{CompanyId, RawShipmentRecord, ValidationError};

/// Rows requested per company when nothing else is configured.
pub const DEFAULT_FETCH_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    Unauthorized,
    InvalidRequest,
    InvalidResponse,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unauthorized,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Informational only; the engine never retries a fetch.
    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Inclusive calendar range on the shipment date. A missing bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ValidationError::InvertedDateRange {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Both bounds set.
    pub fn between(start: Date, end: Date) -> Result<Self, ValidationError> {
        Self::new(Some(start), Some(end))
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| start <= date) && self.end.is_none_or(|end| date <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentQuery {
    pub company_id: CompanyId,
    pub limit: usize,
    pub offset: usize,
    pub date_range: Option<DateRange>,
}

impl ShipmentQuery {
    pub fn new(company_id: CompanyId, limit: usize) -> Result<Self, SourceError> {
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "shipment query limit must be greater than zero",
            ));
        }
        Ok(Self {
            company_id,
            limit,
            offset: 0,
            date_range: None,
        })
    }

    pub fn with_date_range(mut self, date_range: Option<DateRange>) -> Self {
        self.date_range = date_range;
        self
    }
}

/// One page of raw rows. `ok == false` means the upstream declined to answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShipmentPage {
    pub ok: bool,
    pub rows: Vec<RawShipmentRecord>,
}

impl ShipmentPage {
    pub fn ok(rows: Vec<RawShipmentRecord>) -> Self {
        Self { ok: true, rows }
    }

    pub fn declined() -> Self {
        Self {
            ok: false,
            rows: Vec::new(),
        }
    }
}

/// Where raw shipment rows come from.
///
/// Implementations must be `Send + Sync`; the engine holds one behind an
/// `Arc` and may be driven from any tokio worker.
pub trait ShipmentSource: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn fetch_shipments<'a>(
        &'a self,
        query: ShipmentQuery,
    ) -> Pin<Box<dyn Future<Output = Result<ShipmentPage, SourceError>> + Send + 'a>>;
}
