//! Quote gateway configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::quote::GatewaySettings;

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    /// Minimum spacing between venue calls in milliseconds (default: 100).
    #[serde(default = "default_min_spacing_ms")]
    pub min_spacing_ms: u64,
    /// Retries after the first attempt on rate limits and timeouts.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
    /// Per-call timeout in milliseconds (default: 5000).
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

const fn default_min_spacing_ms() -> u64 {
    100
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_backoff_base_ms() -> u64 {
    1_000
}

const fn default_backoff_cap_ms() -> u64 {
    10_000
}

const fn default_call_timeout_ms() -> u64 {
    5_000
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            min_spacing_ms: default_min_spacing_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            call_timeout_ms: default_call_timeout_ms(),
        }
    }
}

impl From<&QuoteConfig> for GatewaySettings {
    fn from(config: &QuoteConfig) -> Self {
        Self {
            min_spacing: Duration::from_millis(config.min_spacing_ms),
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_cap: Duration::from_millis(config.backoff_cap_ms),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
        }
    }
}
