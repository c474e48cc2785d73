//! Normalized price quotes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::Mint;

/// A single-hop quote from the swap venue.
///
/// Amounts are atomic units of the respective mints. Quotes are immutable
/// once produced by the quote gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    input_mint: Mint,
    output_mint: Mint,
    in_amount: u64,
    out_amount: u64,
    slippage_bps: u16,
    route: serde_json::Value,
    quoted_at: DateTime<Utc>,
}

impl Quote {
    /// Create a new quote.
    #[must_use]
    pub fn new(
        input_mint: Mint,
        output_mint: Mint,
        in_amount: u64,
        out_amount: u64,
        slippage_bps: u16,
        route: serde_json::Value,
        quoted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            input_mint,
            output_mint,
            in_amount,
            out_amount,
            slippage_bps,
            route,
            quoted_at,
        }
    }

    #[must_use]
    pub const fn input_mint(&self) -> &Mint {
        &self.input_mint
    }

    #[must_use]
    pub const fn output_mint(&self) -> &Mint {
        &self.output_mint
    }

    #[must_use]
    pub const fn in_amount(&self) -> u64 {
        self.in_amount
    }

    #[must_use]
    pub const fn out_amount(&self) -> u64 {
        self.out_amount
    }

    #[must_use]
    pub const fn slippage_bps(&self) -> u16 {
        self.slippage_bps
    }

    /// Opaque venue route metadata, passed back on execution.
    #[must_use]
    pub const fn route(&self) -> &serde_json::Value {
        &self.route
    }

    #[must_use]
    pub const fn quoted_at(&self) -> DateTime<Utc> {
        self.quoted_at
    }
}
