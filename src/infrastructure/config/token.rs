//! Token registry and static path configuration.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::{
    path::{Path, PathOrigin},
    token::Token,
};
use crate::error::{ConfigError, Result};

/// One `[[tokens]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub mint: String,
    pub decimals: u8,
}

/// One `[[paths]]` entry: a pair or triangle starting at its first token.
///
/// The closing token may be omitted; `["USDC", "SOL"]` means
/// `USDC -> SOL -> USDC`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    pub tokens: Vec<String>,
    #[serde(default = "default_min_profit_percent")]
    pub min_profit_percent: f64,
    #[serde(default = "default_max_slippage_bps")]
    pub max_slippage_bps: u16,
}

const fn default_min_profit_percent() -> f64 {
    0.5
}

const fn default_max_slippage_bps() -> u16 {
    50
}

/// Tokens indexed by symbol.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    by_symbol: HashMap<String, Token>,
}

impl TokenRegistry {
    /// Build the registry, rejecting duplicate symbols and mints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] on duplicates or implausible
    /// decimals.
    pub fn new(tokens: &[TokenConfig]) -> Result<Self> {
        let mut by_symbol = HashMap::with_capacity(tokens.len());
        let mut mints = HashMap::with_capacity(tokens.len());
        for t in tokens {
            if t.symbol.is_empty() || t.mint.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "tokens",
                    reason: "symbol and mint must not be empty".to_string(),
                }
                .into());
            }
            if t.decimals > 18 {
                return Err(ConfigError::InvalidValue {
                    field: "tokens.decimals",
                    reason: format!("{} has {} decimals, at most 18 allowed", t.symbol, t.decimals),
                }
                .into());
            }
            if mints.insert(t.mint.clone(), t.symbol.clone()).is_some() {
                return Err(ConfigError::InvalidValue {
                    field: "tokens.mint",
                    reason: format!("mint {} listed twice", t.mint),
                }
                .into());
            }
            let token = Token::new(t.symbol.as_str(), t.mint.as_str(), t.decimals);
            if by_symbol.insert(t.symbol.clone(), token).is_some() {
                return Err(ConfigError::InvalidValue {
                    field: "tokens.symbol",
                    reason: format!("symbol {} listed twice", t.symbol),
                }
                .into());
            }
        }
        Ok(Self { by_symbol })
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Token> {
        self.by_symbol.get(symbol)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownToken`] if `symbol` is not registered.
    pub fn resolve(&self, symbol: &str, field: &'static str) -> Result<Token> {
        self.get(symbol).cloned().ok_or_else(|| {
            ConfigError::UnknownToken {
                field,
                symbol: symbol.to_string(),
            }
            .into()
        })
    }

    /// Every token, sorted by symbol.
    #[must_use]
    pub fn tokens(&self) -> Vec<Token> {
        let mut all: Vec<Token> = self.by_symbol.values().cloned().collect();
        all.sort_by(|a, b| a.symbol().cmp(b.symbol()));
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

impl PathConfig {
    /// Resolve symbols and close the cycle.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown symbols or an invalid cycle.
    pub fn to_path(&self, registry: &TokenRegistry) -> Result<Path> {
        let mut tokens = self
            .tokens
            .iter()
            .map(|s| registry.resolve(s, "paths.tokens"))
            .collect::<Result<Vec<_>>>()?;
        if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
            if tokens.len() > 1 && first.mint() != last.mint() {
                tokens.push(first.clone());
            }
        }
        Ok(Path::new(
            tokens,
            self.min_profit_percent,
            self.max_slippage_bps,
            PathOrigin::Static,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TokenRegistry {
        TokenRegistry::new(&[
            TokenConfig {
                symbol: "USDC".into(),
                mint: "usdc-mint".into(),
                decimals: 6,
            },
            TokenConfig {
                symbol: "SOL".into(),
                mint: "sol-mint".into(),
                decimals: 9,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_open_pair_is_closed() {
        let config = PathConfig {
            tokens: vec!["USDC".into(), "SOL".into()],
            min_profit_percent: 0.3,
            max_slippage_bps: 30,
        };
        let path = config.to_path(&registry()).unwrap();
        assert_eq!(path.key().as_str(), "USDC->SOL->USDC");
        assert_eq!(path.hop_count(), 2);
    }

    #[test]
    fn test_explicitly_closed_cycle_is_kept() {
        let config = PathConfig {
            tokens: vec!["USDC".into(), "SOL".into(), "USDC".into()],
            min_profit_percent: 0.3,
            max_slippage_bps: 30,
        };
        assert_eq!(config.to_path(&registry()).unwrap().hop_count(), 2);
    }

    #[test]
    fn test_unknown_symbol() {
        let config = PathConfig {
            tokens: vec!["USDC".into(), "BONK".into()],
            min_profit_percent: 0.3,
            max_slippage_bps: 30,
        };
        let err = config.to_path(&registry()).unwrap_err();
        assert!(err.to_string().contains("BONK"));
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let token = TokenConfig {
            symbol: "USDC".into(),
            mint: "a".into(),
            decimals: 6,
        };
        let dup = TokenConfig {
            mint: "b".into(),
            ..token.clone()
        };
        assert!(TokenRegistry::new(&[token, dup]).is_err());
    }
}
