//! Engine configuration with environment overrides.
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `TRADELENS_HOME` | `~/.tradelens` | [`EngineConfig::tradelens_home`] |
//! | `TRADELENS_GATEWAY_URL` | unset (offline) | [`EngineConfig::gateway_url`] |
//! | `TRADELENS_API_KEY` | unset | [`EngineConfig::api_key`] |
//! | `TRADELENS_FETCH_LIMIT` | `500` | [`EngineConfig::fetch_limit`] |
//! | `TRADELENS_BATCH_DELAY_MS` | `100` | [`EngineConfig::pacing`] |
//! | `TRADELENS_BATCH_PACING` | `fixed` | [`EngineConfig::pacing`] (`fixed` or `adaptive`) |
//! | `TRADELENS_START_DATE` / `TRADELENS_END_DATE` | unset | [`EngineConfig::date_range`] |

use std::path::PathBuf;
use std::time::Duration;

use time::macros::format_description;
use time::Date;
use tradelens_store::StoreConfig;

use crate::data_source::{DateRange, DEFAULT_FETCH_LIMIT};
use crate::error::ConfigError;
use crate::pacing::{Pacing, DEFAULT_BATCH_DELAY};

pub const ENV_HOME: &str = "TRADELENS_HOME";
pub const ENV_GATEWAY_URL: &str = "TRADELENS_GATEWAY_URL";
pub const ENV_API_KEY: &str = "TRADELENS_API_KEY";
pub const ENV_FETCH_LIMIT: &str = "TRADELENS_FETCH_LIMIT";
pub const ENV_BATCH_DELAY_MS: &str = "TRADELENS_BATCH_DELAY_MS";
pub const ENV_BATCH_PACING: &str = "TRADELENS_BATCH_PACING";
pub const ENV_START_DATE: &str = "TRADELENS_START_DATE";
pub const ENV_END_DATE: &str = "TRADELENS_END_DATE";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub tradelens_home: PathBuf,
    pub gateway_url: Option<String>,
    pub api_key: Option<String>,
    pub fetch_limit: usize,
    pub pacing: Pacing,
    pub date_range: Option<DateRange>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tradelens_home: StoreConfig::default().tradelens_home,
            gateway_url: None,
            api_key: None,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            pacing: Pacing::default(),
            date_range: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(home) = read(ENV_HOME) {
            config.tradelens_home = PathBuf::from(home);
        }
        config.gateway_url = read(ENV_GATEWAY_URL);
        config.api_key = read(ENV_API_KEY);

        if let Some(raw) = read(ENV_FETCH_LIMIT) {
            config.fetch_limit = raw
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_FETCH_LIMIT,
                    value: raw,
                    expected: "a positive integer",
                })?;
        }

        let delay = match read(ENV_BATCH_DELAY_MS) {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_BATCH_DELAY_MS,
                    value: raw,
                    expected: "a whole number of milliseconds",
                }
            })?),
            None => DEFAULT_BATCH_DELAY,
        };
        config.pacing = match read(ENV_BATCH_PACING).map(|raw| raw.to_ascii_lowercase()) {
            None => Pacing::fixed(delay),
            Some(mode) if mode == "fixed" => Pacing::fixed(delay),
            Some(mode) if mode == "adaptive" => Pacing::adaptive(delay),
            Some(mode) => {
                return Err(ConfigError::InvalidValue {
                    key: ENV_BATCH_PACING,
                    value: mode,
                    expected: "`fixed` or `adaptive`",
                })
            }
        };

        config.date_range = match (read(ENV_START_DATE), read(ENV_END_DATE)) {
            (None, None) => None,
            (start, end) => {
                let start = start
                    .map(|raw| parse_config_date(ENV_START_DATE, raw))
                    .transpose()?;
                let end = end
                    .map(|raw| parse_config_date(ENV_END_DATE, raw))
                    .transpose()?;
                Some(DateRange::new(start, end)?)
            }
        };

        Ok(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::under(&self.tradelens_home)
    }
}

fn parse_config_date(key: &'static str, raw: String) -> Result<Date, ConfigError> {
    Date::parse(&raw, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ConfigError::InvalidValue {
            key,
            value: raw,
            expected: "a YYYY-MM-DD date",
        }
    })
}
