//! Circuit breaker configuration.

use chrono::Duration;
use serde::Deserialize;

use crate::domain::breaker::BreakerThresholds;

/// Consecutive-loss thresholds. Trading halts at `severe + 2` losses.
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_warning")]
    pub warning_losses: u32,
    #[serde(default = "default_triggered")]
    pub triggered_losses: u32,
    #[serde(default = "default_severe")]
    pub severe_losses: u32,
    /// Seconds halted before recovery begins (default: 3600).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u32,
}

const fn default_enabled() -> bool {
    true
}

const fn default_warning() -> u32 {
    3
}

const fn default_triggered() -> u32 {
    5
}

const fn default_severe() -> u32 {
    7
}

const fn default_cooldown_secs() -> u32 {
    3_600
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            warning_losses: default_warning(),
            triggered_losses: default_triggered(),
            severe_losses: default_severe(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl From<&CircuitBreakerConfig> for BreakerThresholds {
    fn from(config: &CircuitBreakerConfig) -> Self {
        Self {
            warning: config.warning_losses,
            triggered: config.triggered_losses,
            severe: config.severe_losses,
            cooldown: Duration::seconds(i64::from(config.cooldown_secs)),
        }
    }
}
