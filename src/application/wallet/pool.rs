//! Wallet pool.
//!
//! Selection sorts a snapshot of the pool; there is no shared cursor, so
//! concurrent selections cannot skip or double-step an index.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::domain::{id::WalletId, opportunity::Opportunity, wallet::WalletEntry};
use crate::port::outbound::balance::BalanceOracle;

/// Pool of wallets available for trades.
pub struct WalletPool {
    wallets: RwLock<Vec<WalletEntry>>,
    oracle: Arc<dyn BalanceOracle>,
}

impl WalletPool {
    #[must_use]
    pub fn new(wallets: Vec<WalletEntry>, oracle: Arc<dyn BalanceOracle>) -> Self {
        Self {
            wallets: RwLock::new(wallets),
            oracle,
        }
    }

    /// Snapshot of every entry in configuration order.
    #[must_use]
    pub fn entries(&self) -> Vec<WalletEntry> {
        self.wallets.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wallets.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wallets.read().is_empty()
    }

    /// Pick the wallet to fund `amount` atomic units of the opportunity's
    /// base token.
    ///
    /// Only ready wallets the oracle reports as sufficiently funded qualify.
    /// Among those: never used first, then least recently used, then fewest
    /// transactions, then id. `None` when nothing qualifies.
    pub async fn get_best_wallet(&self, opportunity: &Opportunity, amount: u64) -> Option<WalletEntry> {
        let token = opportunity.path().base();
        let mut candidates: Vec<WalletEntry> =
            self.entries().into_iter().filter(WalletEntry::is_ready).collect();
        candidates.sort_by(WalletEntry::selection_order);

        for wallet in candidates {
            if self.oracle.sufficient_balance(&wallet, amount, token).await {
                debug!(wallet = %wallet.id(), amount, "Wallet selected");
                return Some(wallet);
            }
            debug!(wallet = %wallet.id(), amount, "Wallet lacks balance");
        }
        None
    }

    /// Record a trade on `id` and refresh its balance of the traded token.
    ///
    /// A failed refresh is logged; the usage update is kept.
    pub async fn update_after_trade(&self, id: &WalletId, opportunity: &Opportunity) {
        self.update_after_trade_at(id, opportunity, Utc::now()).await;
    }

    pub async fn update_after_trade_at(
        &self,
        id: &WalletId,
        opportunity: &Opportunity,
        at: DateTime<Utc>,
    ) {
        let wallet = {
            let mut wallets = self.wallets.write();
            let Some(wallet) = wallets.iter_mut().find(|w| w.id() == id) else {
                warn!(wallet = %id, "Trade recorded for unknown wallet");
                return;
            };
            wallet.mark_used(at);
            wallet.clone()
        };

        match self.oracle.balance(&wallet, opportunity.path().base()).await {
            Ok(balance) => {
                if let Some(w) = self.wallets.write().iter_mut().find(|w| w.id() == id) {
                    w.set_balance(balance);
                }
            }
            Err(e) => warn!(wallet = %id, error = %e, "Balance refresh failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{
        balance::StaticBalanceOracle,
        domain::{cycle, quote, wallet},
    };

    fn opportunity() -> Opportunity {
        Opportunity::builder()
            .path(cycle(&["USDC", "SOL"], 0.5))
            .quotes(vec![quote("USDC", "SOL", 100, 7), quote("SOL", "USDC", 7, 102)])
            .build()
            .unwrap()
    }

    fn ids(pool: &WalletPool) -> Vec<String> {
        pool.entries().iter().map(|w| w.id().to_string()).collect()
    }

    #[tokio::test]
    async fn test_prefers_unused_then_least_recent() {
        let pool = WalletPool::new(
            vec![wallet("a"), wallet("b"), wallet("c")],
            Arc::new(StaticBalanceOracle::new(1_000)),
        );
        assert_eq!(ids(&pool), vec!["a", "b", "c"]);
        let opp = opportunity();
        let now = Utc::now();

        pool.update_after_trade_at(&"a".into(), &opp, now).await;
        pool.update_after_trade_at(&"b".into(), &opp, now + chrono::Duration::seconds(1)).await;

        let best = pool.get_best_wallet(&opp, 100).await.unwrap();
        assert_eq!(best.id().as_str(), "c");

        pool.update_after_trade_at(&"c".into(), &opp, now + chrono::Duration::seconds(2)).await;
        let best = pool.get_best_wallet(&opp, 100).await.unwrap();
        assert_eq!(best.id().as_str(), "a");
    }

    #[tokio::test]
    async fn test_skips_underfunded_and_unready() {
        let oracle = StaticBalanceOracle::new(1_000).with_balance("addr-a", 10);
        let unready = WalletEntry::new("b".into(), "addr-b", None);
        let pool = WalletPool::new(vec![wallet("a"), unready, wallet("c")], Arc::new(oracle));

        let best = pool.get_best_wallet(&opportunity(), 100).await.unwrap();
        assert_eq!(best.id().as_str(), "c");
    }

    #[tokio::test]
    async fn test_none_when_nobody_qualifies() {
        let pool = WalletPool::new(vec![wallet("a")], Arc::new(StaticBalanceOracle::new(5)));
        assert!(pool.get_best_wallet(&opportunity(), 100).await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_usage() {
        let oracle = Arc::new(StaticBalanceOracle::new(1_000));
        let pool = WalletPool::new(vec![wallet("a")], oracle.clone());
        oracle.set_failing(true);

        pool.update_after_trade(&"a".into(), &opportunity()).await;
        let entry = &pool.entries()[0];
        assert_eq!(entry.transaction_count(), 1);
        assert!(entry.last_used().is_some());
        assert_eq!(entry.balance(), None);
    }

    #[tokio::test]
    async fn test_refresh_updates_balance() {
        let pool = WalletPool::new(vec![wallet("a")], Arc::new(StaticBalanceOracle::new(777)));
        pool.update_after_trade(&"a".into(), &opportunity()).await;
        assert_eq!(pool.entries()[0].balance(), Some(777));
    }
}
