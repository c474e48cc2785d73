//! Tokens and the allow/deny policy that classifies them.

use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::Mint;

/// A tradable token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    symbol: String,
    mint: Mint,
    decimals: u8,
}

impl Token {
    /// Create a new token.
    pub fn new(symbol: impl Into<String>, mint: impl Into<Mint>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            mint: mint.into(),
            decimals,
        }
    }

    /// Ticker symbol (e.g. "USDC").
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Unique mint address.
    #[must_use]
    pub const fn mint(&self) -> &Mint {
        &self.mint
    }

    /// Decimal precision of atomic amounts.
    #[must_use]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Convert a UI amount (e.g. 1.5 USDC) to atomic units, truncating.
    ///
    /// Returns `None` for negative amounts or values that overflow `u64`.
    #[must_use]
    pub fn to_atomic(&self, ui_amount: Decimal) -> Option<u64> {
        if ui_amount.is_sign_negative() {
            return None;
        }
        let scale = 10u64.checked_pow(u32::from(self.decimals))?;
        ui_amount
            .checked_mul(Decimal::from(scale))?
            .trunc()
            .to_u64()
    }

    /// Convert atomic units back to a UI amount.
    #[must_use]
    pub fn to_ui(&self, atomic: u64) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(atomic), u32::from(self.decimals))
    }
}

/// How a token is treated by the trading policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Explicitly allowlisted.
    Allowed,
    /// Not listed anywhere; tradable only while no allowlist is configured.
    Unlisted,
    /// Explicitly denylisted.
    Denied,
}

/// Allow/deny lists keyed by mint.
///
/// The denylist always wins. A non-empty allowlist restricts trading to the
/// tokens it names.
#[derive(Debug, Clone, Default)]
pub struct TokenPolicy {
    allow: HashSet<Mint>,
    deny: HashSet<Mint>,
}

impl TokenPolicy {
    /// Build a policy from allow and deny mint sets.
    pub fn new(
        allow: impl IntoIterator<Item = Mint>,
        deny: impl IntoIterator<Item = Mint>,
    ) -> Self {
        Self {
            allow: allow.into_iter().collect(),
            deny: deny.into_iter().collect(),
        }
    }

    /// Classify a mint.
    #[must_use]
    pub fn classify(&self, mint: &Mint) -> TokenClass {
        if self.deny.contains(mint) {
            TokenClass::Denied
        } else if self.allow.contains(mint) {
            TokenClass::Allowed
        } else {
            TokenClass::Unlisted
        }
    }

    /// Whether the token may appear in a trade.
    #[must_use]
    pub fn permits(&self, mint: &Mint) -> bool {
        match self.classify(mint) {
            TokenClass::Allowed => true,
            TokenClass::Denied => false,
            TokenClass::Unlisted => self.allow.is_empty(),
        }
    }

    /// True when an allowlist is in force.
    #[must_use]
    pub fn has_allowlist(&self) -> bool {
        !self.allow.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usdc() -> Token {
        Token::new("USDC", "usdc-mint", 6)
    }

    #[test]
    fn test_to_atomic_scales_by_decimals() {
        assert_eq!(usdc().to_atomic(dec!(1.5)), Some(1_500_000));
        assert_eq!(usdc().to_atomic(dec!(0.0000019)), Some(1));
    }

    #[test]
    fn test_to_atomic_rejects_negative() {
        assert_eq!(usdc().to_atomic(dec!(-1)), None);
    }

    #[test]
    fn test_to_ui_roundtrips_display() {
        assert_eq!(usdc().to_ui(2_500_000), dec!(2.5));
    }

    #[test]
    fn test_denylist_wins_over_allowlist() {
        let policy = TokenPolicy::new([Mint::from("a")], [Mint::from("a")]);
        assert_eq!(policy.classify(&Mint::from("a")), TokenClass::Denied);
        assert!(!policy.permits(&Mint::from("a")));
    }

    #[test]
    fn test_allowlist_restricts_unlisted() {
        let open = TokenPolicy::default();
        assert!(open.permits(&Mint::from("x")));

        let restricted = TokenPolicy::new([Mint::from("a")], []);
        assert!(restricted.permits(&Mint::from("a")));
        assert!(!restricted.permits(&Mint::from("x")));
    }
}
