//! Delay policy between companies in a batch run.

use std::time::Duration;

/// Default spacing between upstream calls in a batch.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// How long to wait before the next company in a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Same delay between every pair of items.
    Fixed {
        delay: Duration,
    },
    /// Starts at `base` and widens by `factor` for every consecutive empty
    /// result, capped at `max`. A successful enrichment resets it.
    ///
    /// With `jitter` set, the delay is spread by +/- 50%.
    Adaptive {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Pacing {
    fn default() -> Self {
        Self::Fixed {
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl Pacing {
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    pub fn adaptive(base: Duration) -> Self {
        Self::Adaptive {
            base,
            factor: 2.0,
            max: Duration::from_secs(5),
            jitter: true,
        }
    }

    /// Fixed delay, or the adaptive starting delay.
    pub fn base(self) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Adaptive { base, .. } => base,
        }
    }

    pub fn is_adaptive(self) -> bool {
        matches!(self, Self::Adaptive { .. })
    }

    /// Delay after `consecutive_misses` empty results in a row.
    pub fn delay(self, consecutive_misses: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Adaptive {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(consecutive_misses).unwrap_or(i32::MAX);
                let seconds = base.as_secs_f64() * factor.powi(exponent);
                let capped = if seconds.is_finite() {
                    seconds.min(max.as_secs_f64())
                } else {
                    max.as_secs_f64()
                };
                let delay = Duration::from_secs_f64(capped.max(0.0));

                if !jitter {
                    return delay;
                }

                let millis = delay.as_millis() as u64;
                let spread = millis / 2;
                let offset = fastrand::u64(0..=spread * 2);
                Duration::from_millis((millis + offset).saturating_sub(spread))
            }
        }
    }
}
