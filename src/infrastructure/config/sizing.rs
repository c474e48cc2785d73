//! Position sizing configuration.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::sizing::SizingSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct SizingConfig {
    #[serde(default = "default_min_position_size")]
    pub min_position_size: Decimal,
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    /// Attempts before Kelly sizing applies (default: 5).
    #[serde(default = "default_min_attempts")]
    pub min_attempts: u64,
    /// Fraction of full Kelly, in `(0, 1]` (default: 0.5).
    #[serde(default = "default_kelly_multiplier")]
    pub kelly_multiplier: f64,
    #[serde(default = "default_volatility_factor")]
    pub volatility_factor: f64,
    #[serde(default = "default_loss_percent")]
    pub default_loss_percent: f64,
    #[serde(default = "default_recency_half_life_hours")]
    pub recency_half_life_hours: u32,
}

fn default_min_position_size() -> Decimal {
    Decimal::TEN
}

fn default_max_position_size() -> Decimal {
    Decimal::ONE_THOUSAND
}

const fn default_min_attempts() -> u64 {
    5
}

const fn default_kelly_multiplier() -> f64 {
    0.5
}

const fn default_volatility_factor() -> f64 {
    1.0
}

const fn default_loss_percent() -> f64 {
    1.0
}

const fn default_recency_half_life_hours() -> u32 {
    24
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_position_size: default_min_position_size(),
            max_position_size: default_max_position_size(),
            min_attempts: default_min_attempts(),
            kelly_multiplier: default_kelly_multiplier(),
            volatility_factor: default_volatility_factor(),
            default_loss_percent: default_loss_percent(),
            recency_half_life_hours: default_recency_half_life_hours(),
        }
    }
}

impl From<&SizingConfig> for SizingSettings {
    fn from(config: &SizingConfig) -> Self {
        Self {
            min_position_size: config.min_position_size,
            max_position_size: config.max_position_size,
            min_attempts: config.min_attempts,
            kelly_multiplier: config.kelly_multiplier,
            volatility_factor: config.volatility_factor,
            default_loss_percent: config.default_loss_percent,
            recency_half_life: Duration::hours(i64::from(config.recency_half_life_hours)),
        }
    }
}
