//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all engine settings.
//! Configuration is loaded from a TOML file; environment variables override
//! a few deployment values and supply wallet signing keys.
//!
//! # Example
//!
//! ```no_run
//! use cyclarb::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::breaker::CircuitBreakerConfig;
use super::catalog::CatalogConfig;
use super::logging::LoggingConfig;
use super::policy::PolicyConfig;
use super::quote::QuoteConfig;
use super::scanner::ScannerConfig;
use super::sizing::SizingConfig;
use super::storage::StorageConfig;
use super::token::{PathConfig, TokenConfig, TokenRegistry};
use super::venue::VenueConfig;
use super::wallet::{parse_wallet_keys, wallet_entries, WalletConfig, WALLET_KEYS_ENV};
use crate::application::catalog::ScanMode;
use crate::application::orchestration::EngineSettings;
use crate::domain::{path::Path, wallet::SigningKey, wallet::WalletEntry};
use crate::error::{ConfigError, Result};

/// Overrides `dry_run` when set to `true`/`false`.
pub const DRY_RUN_ENV: &str = "CYCLARB_DRY_RUN";
/// Overrides `[venue] base_url`.
pub const VENUE_URL_ENV: &str = "CYCLARB_VENUE_URL";
/// Overrides `[storage] dir`.
pub const STATE_DIR_ENV: &str = "CYCLARB_STATE_DIR";

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulate executions instead of broadcasting. Defaults to true.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    #[serde(default)]
    pub tokens: Vec<TokenConfig>,

    /// Configured pairs and triangles.
    #[serde(default)]
    pub paths: Vec<PathConfig>,

    #[serde(default)]
    pub quote: QuoteConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub sizing: SizingConfig,

    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    #[serde(default)]
    pub wallets: Vec<WalletConfig>,

    #[serde(default)]
    pub venue: VenueConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Signing keys by wallet id, from `WALLET_KEYS`.
    #[serde(skip)]
    pub wallet_keys: HashMap<String, SigningKey>,
}

const fn default_dry_run() -> bool {
    true
}

impl Config {
    /// Parse configuration from TOML content and validate it.
    ///
    /// Environment overrides are not applied; see [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, apply environment overrides and
    /// validate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - An environment override is malformed
    /// - Validation fails
    pub fn load<P: AsRef<FsPath>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, normally the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed boolean or wallet key list.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(DRY_RUN_ENV) {
            self.dry_run = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: DRY_RUN_ENV,
                        reason: format!("expected true or false, got '{raw}'"),
                    }
                    .into())
                }
            };
        }
        if let Some(url) = lookup(VENUE_URL_ENV) {
            self.venue.base_url = url;
        }
        if let Some(dir) = lookup(STATE_DIR_ENV) {
            self.storage.dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(WALLET_KEYS_ENV) {
            self.wallet_keys = parse_wallet_keys(&raw)?;
        }
        Ok(())
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.venue.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "venue.base_url",
            }
            .into());
        }
        if self.tokens.is_empty() {
            return Err(ConfigError::MissingField { field: "tokens" }.into());
        }
        let registry = self.token_registry()?;
        for path in &self.paths {
            path.to_path(&registry)?;
        }
        let catalog = self.catalog.settings(&registry)?;
        if self.paths.is_empty() && self.catalog.mode == ScanMode::Static {
            return Err(ConfigError::MissingField { field: "paths" }.into());
        }
        if self.catalog.mode == ScanMode::Dynamic && catalog.base.is_none() {
            return Err(ConfigError::MissingField {
                field: "catalog.base",
            }
            .into());
        }
        if self.catalog.min_hops < 2 || self.catalog.max_hops < self.catalog.min_hops {
            return Err(invalid("catalog.max_hops", "hops must satisfy 2 <= min_hops <= max_hops"));
        }
        if self.catalog.top_k == 0 {
            return Err(invalid("catalog.top_k", "must be greater than 0"));
        }
        let ranking = &self.catalog.ranking;
        if [ranking.success_rate_weight, ranking.profit_weight, ranking.recency_weight]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(invalid("catalog.ranking", "weights must be 0 or greater"));
        }

        if self.quote.max_retries > 10 {
            return Err(invalid("quote.max_retries", "must be at most 10"));
        }
        if self.quote.call_timeout_ms == 0 {
            return Err(invalid("quote.call_timeout_ms", "must be greater than 0"));
        }
        if self.quote.backoff_cap_ms < self.quote.backoff_base_ms {
            return Err(invalid("quote.backoff_cap_ms", "must be >= backoff_base_ms"));
        }

        if self.scanner.interval_secs == 0 {
            return Err(invalid("scanner.interval_secs", "must be greater than 0"));
        }
        if self.scanner.concurrency == 0 {
            return Err(invalid("scanner.concurrency", "must be greater than 0"));
        }
        if self.scanner.cycle_deadline_secs == 0 {
            return Err(invalid("scanner.cycle_deadline_secs", "must be greater than 0"));
        }
        if self.scanner.scan_amount <= Decimal::ZERO {
            return Err(invalid("scanner.scan_amount", "must be greater than 0"));
        }
        if self.scanner.total_capital <= Decimal::ZERO {
            return Err(invalid("scanner.total_capital", "must be greater than 0"));
        }

        let sizing = &self.sizing;
        if sizing.min_position_size.is_sign_negative() || sizing.max_position_size <= Decimal::ZERO {
            return Err(invalid("sizing.max_position_size", "must be greater than 0"));
        }
        if sizing.max_position_size < sizing.min_position_size {
            return Err(invalid("sizing.max_position_size", "must be >= min_position_size"));
        }
        if !positive(sizing.kelly_multiplier) || sizing.kelly_multiplier > 1.0 {
            return Err(invalid("sizing.kelly_multiplier", "must be in (0, 1]"));
        }
        if !at_least(sizing.volatility_factor, 1.0) {
            return Err(invalid("sizing.volatility_factor", "must be >= 1.0"));
        }
        if !positive(sizing.default_loss_percent) {
            return Err(invalid("sizing.default_loss_percent", "must be greater than 0"));
        }

        let breaker = &self.circuit_breaker;
        if breaker.warning_losses == 0
            || breaker.warning_losses > breaker.triggered_losses
            || breaker.triggered_losses > breaker.severe_losses
        {
            return Err(invalid(
                "circuit_breaker",
                "thresholds must satisfy 0 < warning <= triggered <= severe",
            ));
        }

        if self.venue.execution_timeout_secs == 0 {
            return Err(invalid("venue.execution_timeout_secs", "must be greater than 0"));
        }
        if !at_least(self.venue.fee_percent_per_hop, 0.0) {
            return Err(invalid("venue.fee_percent_per_hop", "must be 0 or greater"));
        }

        let mut ids: Vec<&str> = self.wallets.iter().map(|w| w.id.as_str()).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("wallets.id", "wallet ids must be unique"));
        }

        if let Some(volume) = self.policy.max_daily_volume {
            if volume <= Decimal::ZERO {
                return Err(invalid("policy.max_daily_volume", "must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Tokens indexed by symbol.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate tokens.
    pub fn token_registry(&self) -> Result<TokenRegistry> {
        TokenRegistry::new(&self.tokens)
    }

    /// Configured static paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a path names an unknown token or is not a cycle.
    pub fn static_paths(&self, registry: &TokenRegistry) -> Result<Vec<Path>> {
        self.paths.iter().map(|p| p.to_path(registry)).collect()
    }

    /// Pool entries with keys attached. In dry-run mode keyless wallets are
    /// ready since nothing is signed.
    #[must_use]
    pub fn wallet_entries(&self) -> Vec<WalletEntry> {
        let mut entries = wallet_entries(&self.wallets, &self.wallet_keys);
        if self.dry_run {
            for entry in &mut entries {
                entry.set_ready(true);
            }
        }
        entries
    }

    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            scan_interval: Duration::from_secs(self.scanner.interval_secs),
            total_capital: self.scanner.total_capital,
            execution_timeout: Duration::from_secs(self.venue.execution_timeout_secs),
            dry_run: self.dry_run,
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn at_least(value: f64, min: f64) -> bool {
    value.is_finite() && value >= min
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
