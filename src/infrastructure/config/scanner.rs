//! Scan loop and scanner configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::scanner::ScannerSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Seconds between cycles (default: 30).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Paths walked in parallel (default: 3).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Wall-clock budget of one scan in seconds (default: 20).
    #[serde(default = "default_cycle_deadline_secs")]
    pub cycle_deadline_secs: u64,
    /// Scan amount in base-token UI units (default: 100).
    #[serde(default = "default_scan_amount")]
    pub scan_amount: Decimal,
    /// Capital shared by one cycle's trades, base-token UI units.
    #[serde(default = "default_total_capital")]
    pub total_capital: Decimal,
}

const fn default_interval_secs() -> u64 {
    30
}

const fn default_concurrency() -> usize {
    3
}

const fn default_cycle_deadline_secs() -> u64 {
    20
}

fn default_scan_amount() -> Decimal {
    Decimal::ONE_HUNDRED
}

fn default_total_capital() -> Decimal {
    Decimal::ONE_THOUSAND
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            concurrency: default_concurrency(),
            cycle_deadline_secs: default_cycle_deadline_secs(),
            scan_amount: default_scan_amount(),
            total_capital: default_total_capital(),
        }
    }
}

impl From<&ScannerConfig> for ScannerSettings {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            cycle_deadline: Duration::from_secs(config.cycle_deadline_secs),
            scan_amount: config.scan_amount,
        }
    }
}
