//! Swap venue endpoint configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::http::HttpSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    /// Base URL of the quote/swap API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base URL of the balance API. Defaults to `base_url`.
    #[serde(default)]
    pub balance_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Timeout for one execution in seconds (default: 30).
    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,
    /// Extra profit percent required per hop to cover fees.
    #[serde(default)]
    pub fee_percent_per_hop: f64,
}

fn default_base_url() -> String {
    "https://quote-api.jup.ag/v6".into()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

const fn default_execution_timeout_secs() -> u64 {
    30
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            balance_url: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            execution_timeout_secs: default_execution_timeout_secs(),
            fee_percent_per_hop: 0.0,
        }
    }
}

impl VenueConfig {
    #[must_use]
    pub fn balance_url(&self) -> &str {
        self.balance_url.as_deref().unwrap_or(&self.base_url)
    }
}

impl From<&VenueConfig> for HttpSettings {
    fn from(config: &VenueConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}
