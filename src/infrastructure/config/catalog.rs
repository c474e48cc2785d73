//! Path catalog and ranking configuration.

use chrono::Duration;
use serde::Deserialize;

use super::token::TokenRegistry;
use crate::application::catalog::{CatalogSettings, CycleBounds, RankingWeights, ScanMode};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub mode: ScanMode,
    /// Symbol generated cycles start and end at.
    #[serde(default)]
    pub base: Option<String>,
    /// Symbols generated cycles may pass through. Empty means every token.
    #[serde(default)]
    pub universe: Vec<String>,
    #[serde(default = "default_min_hops")]
    pub min_hops: usize,
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    /// Upper bound on generated cycles.
    #[serde(default = "default_cycle_limit")]
    pub cycle_limit: usize,
    /// Generated cycles scanned per (base, hop count) group.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_dynamic_min_profit_percent")]
    pub dynamic_min_profit_percent: f64,
    #[serde(default = "default_dynamic_max_slippage_bps")]
    pub dynamic_max_slippage_bps: u16,
    #[serde(default)]
    pub ranking: RankingConfig,
}

/// Weights of the path ranking score.
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_success_rate_weight")]
    pub success_rate_weight: f64,
    #[serde(default = "default_profit_weight")]
    pub profit_weight: f64,
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,
    #[serde(default = "default_profit_scale_percent")]
    pub profit_scale_percent: f64,
    #[serde(default = "default_recency_half_life_hours")]
    pub recency_half_life_hours: u32,
    #[serde(default = "default_confidence_prior")]
    pub confidence_prior: f64,
    #[serde(default = "default_exploration_score")]
    pub exploration_score: f64,
}

const fn default_min_hops() -> usize {
    2
}

const fn default_max_hops() -> usize {
    3
}

const fn default_cycle_limit() -> usize {
    5_000
}

const fn default_top_k() -> usize {
    10
}

const fn default_dynamic_min_profit_percent() -> f64 {
    0.5
}

const fn default_dynamic_max_slippage_bps() -> u16 {
    50
}

const fn default_success_rate_weight() -> f64 {
    0.5
}

const fn default_profit_weight() -> f64 {
    0.3
}

const fn default_recency_weight() -> f64 {
    0.2
}

const fn default_profit_scale_percent() -> f64 {
    1.0
}

const fn default_recency_half_life_hours() -> u32 {
    24
}

const fn default_confidence_prior() -> f64 {
    10.0
}

const fn default_exploration_score() -> f64 {
    0.5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::default(),
            base: None,
            universe: Vec::new(),
            min_hops: default_min_hops(),
            max_hops: default_max_hops(),
            cycle_limit: default_cycle_limit(),
            top_k: default_top_k(),
            dynamic_min_profit_percent: default_dynamic_min_profit_percent(),
            dynamic_max_slippage_bps: default_dynamic_max_slippage_bps(),
            ranking: RankingConfig::default(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            success_rate_weight: default_success_rate_weight(),
            profit_weight: default_profit_weight(),
            recency_weight: default_recency_weight(),
            profit_scale_percent: default_profit_scale_percent(),
            recency_half_life_hours: default_recency_half_life_hours(),
            confidence_prior: default_confidence_prior(),
            exploration_score: default_exploration_score(),
        }
    }
}

impl From<&RankingConfig> for RankingWeights {
    fn from(config: &RankingConfig) -> Self {
        Self {
            success_rate: config.success_rate_weight,
            profit: config.profit_weight,
            recency: config.recency_weight,
            profit_scale_percent: config.profit_scale_percent,
            recency_half_life: Duration::hours(i64::from(config.recency_half_life_hours)),
            confidence_prior: config.confidence_prior,
            exploration_score: config.exploration_score,
        }
    }
}

impl CatalogConfig {
    /// Resolve symbols against the token registry.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` or a `universe` entry is not a known token.
    pub fn settings(&self, registry: &TokenRegistry) -> Result<CatalogSettings> {
        let base = self
            .base
            .as_deref()
            .map(|s| registry.resolve(s, "catalog.base"))
            .transpose()?;
        let universe = if self.universe.is_empty() {
            registry.tokens()
        } else {
            self.universe
                .iter()
                .map(|s| registry.resolve(s, "catalog.universe"))
                .collect::<Result<Vec<_>>>()?
        };
        Ok(CatalogSettings {
            mode: self.mode,
            base,
            universe,
            bounds: CycleBounds {
                min_hops: self.min_hops,
                max_hops: self.max_hops,
                limit: self.cycle_limit,
            },
            top_k: self.top_k,
            dynamic_min_profit_percent: self.dynamic_min_profit_percent,
            dynamic_max_slippage_bps: self.dynamic_max_slippage_bps,
            weights: RankingWeights::from(&self.ranking),
        })
    }
}
