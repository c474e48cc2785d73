//! Domain validation errors for core domain types.
//!
//! Returned by constructors that enforce domain invariants, such as
//! [`Path::new`](crate::domain::path::Path::new) rejecting open cycles.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A cycle must start and end at the same token.
    #[error("path is not a cycle: starts at {first}, ends at {last}")]
    OpenCycle {
        /// Symbol of the first token.
        first: String,
        /// Symbol of the last token.
        last: String,
    },

    /// A cycle needs at least two hops.
    #[error("path needs at least 2 hops, got {hops}")]
    TooFewHops {
        /// Number of hops provided.
        hops: usize,
    },

    /// Consecutive tokens in a path must differ.
    #[error("path repeats {symbol} on consecutive hops")]
    SelfSwap {
        /// The repeated symbol.
        symbol: String,
    },

    /// Minimum profit threshold must be a finite number.
    #[error("min profit percent must be finite, got {value}")]
    NonFiniteThreshold {
        /// The invalid threshold.
        value: f64,
    },
}
