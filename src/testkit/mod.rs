//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`venue`] - [`ScriptedVenue`](venue::ScriptedVenue), a rate-table swap
//!   venue with scripted failures and call counters.
//! - [`store`] - [`MemoryStore`](store::MemoryStore), an in-memory snapshot
//!   store that can be switched into a failing mode.
//! - [`balance`] - [`StaticBalanceOracle`](balance::StaticBalanceOracle).
//! - [`domain`] - Builders for tokens, paths, quotes and wallets.
//! - [`engine`] - [`TestEngine`](engine::TestEngine), an orchestrator wired
//!   to the fakes above.

pub mod balance;
pub mod domain;
pub mod engine;
pub mod store;
pub mod venue;
