// Shared helpers for the behaviour tests
use std::sync::Arc;

pub use tradelens_core::{CompanyId, ManualClock, UtcDateTime};

/// Manual clock pinned to an RFC3339 instant.
pub fn clock_at(rfc3339: &str) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        UtcDateTime::parse(rfc3339).expect("valid timestamp"),
    ))
}

pub fn company(id: &str) -> CompanyId {
    CompanyId::parse(id).expect("valid company id")
}
