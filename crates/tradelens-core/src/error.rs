use thiserror::Error;

/// Validation and contract errors exposed by `tradelens-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("company id cannot be empty")]
    EmptyCompanyId,
    #[error("company id length {len} exceeds max {max}")]
    CompanyIdTooLong { len: usize, max: usize },
    #[error("company id contains invalid character '{ch}' at index {index}")]
    CompanyIdInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },
}

/// Failures inside one cache tier. Never surfaced past the cache manager.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] tradelens_store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bad value in the engine's environment configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
