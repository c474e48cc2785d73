//! Fixed-balance [`BalanceOracle`] for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{token::Token, wallet::WalletEntry};
use crate::error::VenueError;
use crate::port::outbound::balance::BalanceOracle;

/// Balances keyed by wallet address. Unknown addresses use the default.
pub struct StaticBalanceOracle {
    default_balance: u64,
    balances: Mutex<HashMap<String, u64>>,
    failing: Mutex<bool>,
}

impl StaticBalanceOracle {
    /// Every wallet holds `default_balance` of every token.
    pub fn new(default_balance: u64) -> Self {
        Self {
            default_balance,
            balances: Mutex::new(HashMap::new()),
            failing: Mutex::new(false),
        }
    }

    pub fn with_balance(self, address: &str, balance: u64) -> Self {
        self.set_balance(address, balance);
        self
    }

    pub fn set_balance(&self, address: &str, balance: u64) {
        self.balances.lock().insert(address.to_string(), balance);
    }

    /// Make balance lookups fail.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    fn lookup(&self, address: &str) -> Result<u64, VenueError> {
        if *self.failing.lock() {
            return Err(VenueError::Transport("balance oracle offline".into()));
        }
        Ok(self
            .balances
            .lock()
            .get(address)
            .copied()
            .unwrap_or(self.default_balance))
    }
}

#[async_trait]
impl BalanceOracle for StaticBalanceOracle {
    async fn sufficient_balance(&self, wallet: &WalletEntry, amount: u64, _token: &Token) -> bool {
        self.lookup(wallet.address())
            .map(|balance| balance >= amount)
            .unwrap_or(false)
    }

    async fn balance(&self, wallet: &WalletEntry, _token: &Token) -> Result<u64, VenueError> {
        self.lookup(wallet.address())
    }
}
