//! Host configuration from environment variables.
//!
//! Every setting has a default. A value that is present but does not parse
//! is reported with `warn!` and replaced by the default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use pursuit_core::constants::{DEFAULT_FEED_ADDR, TICK_INTERVAL};
use pursuit_core::enums::{FeedMode, FeedTransport, PresetId, TargetPolicy};
use pursuit_feed::IngestorConfig;

pub const MODE_VAR: &str = "PURSUIT_MODE";
pub const FEED_ADDR_VAR: &str = "PURSUIT_FEED_ADDR";
pub const FEED_TRANSPORT_VAR: &str = "PURSUIT_FEED_TRANSPORT";
pub const PRESET_VAR: &str = "PURSUIT_PRESET";
pub const TARGET_POLICY_VAR: &str = "PURSUIT_TARGET_POLICY";
pub const TICK_MS_VAR: &str = "PURSUIT_TICK_MS";
pub const RECV_TIMEOUT_MS_VAR: &str = "PURSUIT_RECV_TIMEOUT_MS";
pub const SHUTDOWN_TIMEOUT_MS_VAR: &str = "PURSUIT_SHUTDOWN_TIMEOUT_MS";
pub const MAX_TICKS_VAR: &str = "PURSUIT_MAX_TICKS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: FeedMode,
    pub feed_addr: String,
    pub transport: FeedTransport,
    /// Scenario and controller tuning. In live mode only the controllers are used.
    pub preset: PresetId,
    pub policy: TargetPolicy,
    pub tick_interval: Duration,
    pub ingestor: IngestorConfig,
    /// Stop after this many ticks; run until shut down when `None`.
    pub max_ticks: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: FeedMode::default(),
            feed_addr: DEFAULT_FEED_ADDR.to_string(),
            transport: FeedTransport::default(),
            preset: PresetId::default(),
            policy: TargetPolicy::default(),
            tick_interval: TICK_INTERVAL,
            ingestor: IngestorConfig::default(),
            max_ticks: None,
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            parsed::<u64>(&lookup, key)
                .filter(|&ms| ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let ingestor = IngestorConfig {
            recv_timeout: millis(RECV_TIMEOUT_MS_VAR, defaults.ingestor.recv_timeout),
            shutdown_timeout: millis(SHUTDOWN_TIMEOUT_MS_VAR, defaults.ingestor.shutdown_timeout),
            ..defaults.ingestor
        };

        Self {
            mode: parsed(&lookup, MODE_VAR).unwrap_or(defaults.mode),
            feed_addr: lookup(FEED_ADDR_VAR)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.feed_addr),
            transport: parsed(&lookup, FEED_TRANSPORT_VAR).unwrap_or(defaults.transport),
            preset: parsed(&lookup, PRESET_VAR).unwrap_or(defaults.preset),
            policy: parsed(&lookup, TARGET_POLICY_VAR).unwrap_or(defaults.policy),
            tick_interval: millis(TICK_MS_VAR, defaults.tick_interval),
            ingestor,
            max_ticks: parsed(&lookup, MAX_TICKS_VAR),
        }
    }

    /// Seconds per control tick.
    pub fn dt(&self) -> f64 {
        self.tick_interval.as_secs_f64()
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(var = key, value = %raw, error = %e, "ignoring invalid setting");
            None
        }
    }
}
