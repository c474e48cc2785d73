//! cyclarb - multi-hop token-swap arbitrage decision engine.
//!
//! Each cycle walks closed token paths (`USDC -> SOL -> USDC`, triangles
//! and generated cycles) through a rate-limited quote gateway, keeps the
//! paths whose round trip clears their profit threshold, sizes each trade
//! with a conservative Kelly fraction from per-path history, and gates
//! everything behind a graduated circuit breaker.
//!
//! # Architecture
//!
//! - [`domain`] - Tokens, paths, quotes, opportunities, history records,
//!   breaker state and wallet entries
//! - [`port`] - Traits for the swap venue, balance oracle, snapshot store,
//!   cost signal, trade policy and notifiers
//! - [`application`] - Quote gateway, path catalog, scanner, sizing,
//!   circuit breaker, wallet pool and the orchestrator
//! - [`adapter`] - CLI, HTTP venue and balance oracle, file snapshot store
//! - [`infrastructure`] - Configuration, wiring and process lifecycle
//!
//! # Example
//!
//! ```no_run
//! use cyclarb::infrastructure::{bootstrap, config::Config, runtime};
//!
//! # async fn example() -> cyclarb::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let ctx = bootstrap::build_context(&config).await?;
//! runtime::run_once(ctx).await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
