//! Builders for domain primitives used across tests.
//!
//! Mints are the lowercase symbol so rate tables in
//! [`ScriptedVenue`](super::venue::ScriptedVenue) read naturally.

use chrono::Utc;

use crate::domain::{
    path::{Path, PathOrigin},
    quote::Quote,
    token::Token,
    wallet::{SigningKey, WalletEntry},
};

/// A token whose mint is the lowercase symbol, with 6 decimals.
pub fn token(symbol: &str) -> Token {
    Token::new(symbol, symbol.to_lowercase(), 6)
}

/// A closed cycle through `symbols` (the base is appended at the end).
///
/// # Panics
///
/// Panics if the symbols do not form a valid cycle.
pub fn cycle(symbols: &[&str], min_profit_percent: f64) -> Path {
    let mut tokens: Vec<Token> = symbols.iter().map(|s| token(s)).collect();
    tokens.push(token(symbols[0]));
    Path::new(tokens, min_profit_percent, 50, PathOrigin::Static).expect("valid test cycle")
}

/// Same as [`cycle`] but tagged as dynamically generated.
pub fn dynamic_cycle(symbols: &[&str], min_profit_percent: f64) -> Path {
    let mut tokens: Vec<Token> = symbols.iter().map(|s| token(s)).collect();
    tokens.push(token(symbols[0]));
    Path::new(tokens, min_profit_percent, 50, PathOrigin::Dynamic).expect("valid test cycle")
}

/// A quote between two symbols.
pub fn quote(input: &str, output: &str, amount_in: u64, amount_out: u64) -> Quote {
    Quote::new(
        input.to_lowercase().into(),
        output.to_lowercase().into(),
        amount_in,
        amount_out,
        50,
        serde_json::Value::Null,
        Utc::now(),
    )
}

/// A ready wallet whose address is `addr-{id}`.
pub fn wallet(id: &str) -> WalletEntry {
    WalletEntry::new(
        id.into(),
        format!("addr-{id}"),
        Some(SigningKey::new(format!("key-{id}"))),
    )
}
