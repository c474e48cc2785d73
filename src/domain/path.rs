//! Arbitrage cycles.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::PathKey;
use super::token::Token;

/// Where a path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathOrigin {
    /// Configured pair or triangle.
    Static,
    /// Generated from the token graph.
    Dynamic,
}

/// An ordered token sequence that starts and ends at the same token.
///
/// Construction through [`Path::new`] guarantees cycle closure, at least two
/// hops, and no self-swaps between consecutive tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    tokens: Vec<Token>,
    min_profit_percent: f64,
    max_slippage_bps: u16,
    origin: PathOrigin,
    key: PathKey,
}

impl Path {
    /// Build a validated cycle.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] if the sequence is not closed, has fewer than
    /// two hops, swaps a token into itself, or the threshold is not finite.
    pub fn new(
        tokens: Vec<Token>,
        min_profit_percent: f64,
        max_slippage_bps: u16,
        origin: PathOrigin,
    ) -> Result<Self, DomainError> {
        let hops = tokens.len().saturating_sub(1);
        if hops < 2 {
            return Err(DomainError::TooFewHops { hops });
        }
        let (first, last) = (&tokens[0], &tokens[tokens.len() - 1]);
        if first.mint() != last.mint() {
            return Err(DomainError::OpenCycle {
                first: first.symbol().to_string(),
                last: last.symbol().to_string(),
            });
        }
        if let Some(pair) = tokens.windows(2).find(|w| w[0].mint() == w[1].mint()) {
            return Err(DomainError::SelfSwap {
                symbol: pair[0].symbol().to_string(),
            });
        }
        if !min_profit_percent.is_finite() {
            return Err(DomainError::NonFiniteThreshold {
                value: min_profit_percent,
            });
        }

        let key = PathKey::from_symbols(tokens.iter().map(Token::symbol));
        Ok(Self {
            tokens,
            min_profit_percent,
            max_slippage_bps,
            origin,
            key,
        })
    }

    /// Stable identity used for history and ranking.
    #[must_use]
    pub const fn key(&self) -> &PathKey {
        &self.key
    }

    /// The token the cycle starts and ends with.
    #[must_use]
    pub fn base(&self) -> &Token {
        &self.tokens[0]
    }

    /// All tokens including the closing one.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of swaps in the cycle.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.tokens.len() - 1
    }

    /// Iterate `(input, output)` token pairs in order.
    pub fn hops(&self) -> impl Iterator<Item = (&Token, &Token)> {
        self.tokens.windows(2).map(|w| (&w[0], &w[1]))
    }

    /// Minimum profit, in percent, required to emit an opportunity.
    #[must_use]
    pub const fn min_profit_percent(&self) -> f64 {
        self.min_profit_percent
    }

    /// Slippage tolerance per hop in basis points.
    #[must_use]
    pub const fn max_slippage_bps(&self) -> u16 {
        self.max_slippage_bps
    }

    #[must_use]
    pub const fn origin(&self) -> PathOrigin {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(symbol: &str) -> Token {
        Token::new(symbol, format!("{symbol}-mint"), 6)
    }

    #[test]
    fn test_new_accepts_closed_triangle() {
        let path = Path::new(
            vec![t("USDC"), t("SOL"), t("BONK"), t("USDC")],
            0.5,
            50,
            PathOrigin::Static,
        )
        .unwrap();

        assert_eq!(path.key().as_str(), "USDC->SOL->BONK->USDC");
        assert_eq!(path.hop_count(), 3);
        assert_eq!(path.base().symbol(), "USDC");
        let hops: Vec<_> = path.hops().map(|(a, b)| (a.symbol(), b.symbol())).collect();
        assert_eq!(hops, vec![("USDC", "SOL"), ("SOL", "BONK"), ("BONK", "USDC")]);
    }

    #[test]
    fn test_new_rejects_open_cycle() {
        let err = Path::new(vec![t("USDC"), t("SOL"), t("BONK")], 0.5, 50, PathOrigin::Static)
            .unwrap_err();
        assert!(matches!(err, DomainError::OpenCycle { .. }));
    }

    #[test]
    fn test_new_rejects_single_hop() {
        let err = Path::new(vec![t("USDC"), t("USDC")], 0.5, 50, PathOrigin::Static).unwrap_err();
        assert_eq!(err, DomainError::TooFewHops { hops: 1 });
    }

    #[test]
    fn test_new_rejects_self_swap() {
        let err = Path::new(
            vec![t("USDC"), t("SOL"), t("SOL"), t("USDC")],
            0.5,
            50,
            PathOrigin::Dynamic,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::SelfSwap { .. }));
    }
}
