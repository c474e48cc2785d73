//! Swap venue port for quotes and execution.
//!
//! This is the primary integration point with the routing venue. One
//! implementation is selected at construction; callers never check for
//! alternative client shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{id::Mint, quote::Quote, wallet::WalletEntry};
use crate::error::VenueError;

/// Raw quote as returned by a venue, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueQuote {
    /// Expected output in atomic units of the output mint.
    pub out_amount: u64,
    /// Opaque route metadata passed back on execution.
    pub route: serde_json::Value,
}

/// Result of submitting (or simulating) a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Whether the venue reports the swap sequence as landed.
    pub success: bool,
    /// Transaction reference, if the venue produced one.
    pub tx_ref: Option<String>,
}

/// Swap-routing venue.
#[async_trait]
pub trait SwapVenue: Send + Sync {
    /// Short venue name for logs.
    fn name(&self) -> &'static str;

    /// Quote a single swap.
    async fn quote(
        &self,
        input: &Mint,
        output: &Mint,
        amount: u64,
        slippage_bps: u16,
    ) -> Result<VenueQuote, VenueError>;

    /// Execute the hops described by `route` with `wallet`.
    ///
    /// When `simulate` is true the venue must not broadcast anything.
    async fn execute(
        &self,
        route: &[Quote],
        wallet: &WalletEntry,
        simulate: bool,
    ) -> Result<ExecutionReceipt, VenueError>;
}
