//! Time source for cache expiry and computation timestamps.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::UtcDateTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: UtcDateTime) -> Self {
        Self {
            millis: AtomicI64::new(start.unix_millis()),
        }
    }

    pub fn set(&self, now: UtcDateTime) {
        self.millis.store(now.unix_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::from_unix_millis(self.millis.load(Ordering::SeqCst))
    }
}
