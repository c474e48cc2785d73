//! External trade policy port (volume and trade-count caps).
//!
//! Consulted after the circuit breaker allows trading and before sizing is
//! committed to a wallet.

use rust_decimal::Decimal;
use thiserror::Error;

/// Why a trade was refused by policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyDenial {
    #[error("daily trade cap reached: {count} >= {limit}")]
    TradeCap { count: u32, limit: u32 },

    #[error("daily volume cap reached: {volume} + {amount} > {limit}")]
    VolumeCap {
        volume: Decimal,
        amount: Decimal,
        limit: Decimal,
    },
}

/// Caps applied across trades.
pub trait TradePolicy: Send + Sync {
    /// Check whether a trade of `amount` capital units may proceed.
    fn admit(&self, amount: Decimal) -> Result<(), PolicyDenial>;

    /// Record a submitted trade against the caps.
    fn record_trade(&self, amount: Decimal);
}

/// Policy that admits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl TradePolicy for Unrestricted {
    fn admit(&self, _amount: Decimal) -> Result<(), PolicyDenial> {
        Ok(())
    }

    fn record_trade(&self, _amount: Decimal) {}
}
