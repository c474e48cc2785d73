//! Signing identities available for trades.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::WalletId;

/// Opaque signing key material. Never printed.
#[derive(Clone)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Expose the secret to the execution layer.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// One wallet in the pool.
///
/// Counters are monotonically non-decreasing for the life of the process.
#[derive(Debug, Clone, Serialize)]
pub struct WalletEntry {
    id: WalletId,
    address: String,
    #[serde(skip)]
    key: Option<SigningKey>,
    last_used: Option<DateTime<Utc>>,
    transaction_count: u64,
    balance: Option<u64>,
    ready: bool,
}

impl WalletEntry {
    /// A wallet is ready when it has signing material.
    #[must_use]
    pub fn new(id: WalletId, address: impl Into<String>, key: Option<SigningKey>) -> Self {
        let ready = key.is_some();
        Self {
            id,
            address: address.into(),
            key,
            last_used: None,
            transaction_count: 0,
            balance: None,
            ready,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &WalletId {
        &self.id
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub const fn key(&self) -> Option<&SigningKey> {
        self.key.as_ref()
    }

    #[must_use]
    pub const fn last_used(&self) -> Option<DateTime<Utc>> {
        self.last_used
    }

    #[must_use]
    pub const fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    /// Last refreshed balance of the traded token, atomic units.
    #[must_use]
    pub const fn balance(&self) -> Option<u64> {
        self.balance
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Record a completed trade.
    pub fn mark_used(&mut self, at: DateTime<Utc>) {
        self.transaction_count = self.transaction_count.saturating_add(1);
        self.last_used = Some(match self.last_used {
            Some(prev) if prev > at => prev,
            _ => at,
        });
    }

    pub fn set_balance(&mut self, balance: u64) {
        self.balance = Some(balance);
    }

    /// Selection order: never used first, then least recently used, then
    /// fewest transactions, then label.
    #[must_use]
    pub fn selection_order(&self, other: &Self) -> Ordering {
        match (self.last_used, other.last_used) {
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (a, b) => a.cmp(&b),
        }
        .then_with(|| self.transaction_count.cmp(&other.transaction_count))
        .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_key_is_redacted() {
        let key = SigningKey::new("super-secret");
        assert!(!format!("{key:?}").contains("super-secret"));
    }

    #[test]
    fn test_ready_requires_key() {
        assert!(WalletEntry::new("a".into(), "addr", Some(SigningKey::new("k"))).is_ready());
        assert!(!WalletEntry::new("b".into(), "addr", None).is_ready());
    }

    #[test]
    fn test_mark_used_is_monotonic() {
        let now = Utc::now();
        let mut w = WalletEntry::new("a".into(), "addr", None);
        w.mark_used(now);
        w.mark_used(now - Duration::seconds(30));
        assert_eq!(w.transaction_count(), 2);
        assert_eq!(w.last_used(), Some(now));
    }

    #[test]
    fn test_selection_order_prefers_unused_then_oldest() {
        let now = Utc::now();
        let unused = WalletEntry::new("z".into(), "1", None);
        let mut old = WalletEntry::new("a".into(), "2", None);
        old.mark_used(now - Duration::minutes(10));
        let mut recent = WalletEntry::new("b".into(), "3", None);
        recent.mark_used(now);

        let mut wallets = vec![recent.clone(), old.clone(), unused.clone()];
        wallets.sort_by(WalletEntry::selection_order);
        let order: Vec<_> = wallets.iter().map(|w| w.id().as_str()).collect();
        assert_eq!(order, vec!["z", "a", "b"]);
    }
}
