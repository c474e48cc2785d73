//! Wallet balance oracle port.

use async_trait::async_trait;

use crate::domain::{token::Token, wallet::WalletEntry};
use crate::error::VenueError;

/// Answers whether a wallet can fund a trade.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// True when `wallet` holds at least `amount` atomic units of `token`.
    ///
    /// Lookup failures must resolve to `false`.
    async fn sufficient_balance(&self, wallet: &WalletEntry, amount: u64, token: &Token) -> bool;

    /// Current balance of `token` in atomic units.
    async fn balance(&self, wallet: &WalletEntry, token: &Token) -> Result<u64, VenueError>;
}
