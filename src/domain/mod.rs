//! Venue-agnostic domain types: tokens, cycles, quotes, opportunities,
//! per-path history, circuit breaker state and wallet entries.

pub mod breaker;
pub mod error;
pub mod history;
pub mod id;
pub mod opportunity;
pub mod path;
pub mod quote;
pub mod token;
pub mod wallet;
