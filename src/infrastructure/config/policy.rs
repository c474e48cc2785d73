//! Token and trade policy configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::policy::DailyCapPolicy;
use crate::domain::{id::Mint, token::TokenPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// Mints that may be traded. Empty means every mint not denied.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Mints that are never traded.
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default)]
    pub max_daily_trades: Option<u32>,
    /// Daily volume cap in base-token UI units.
    #[serde(default)]
    pub max_daily_volume: Option<Decimal>,
}

impl PolicyConfig {
    #[must_use]
    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy::new(
            self.allow.iter().map(|m| Mint::new(m.as_str())),
            self.deny.iter().map(|m| Mint::new(m.as_str())),
        )
    }

    #[must_use]
    pub fn trade_policy(&self) -> DailyCapPolicy {
        DailyCapPolicy::new(self.max_daily_trades, self.max_daily_volume)
    }
}
