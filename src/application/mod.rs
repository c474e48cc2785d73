//! Application layer.
//!
//! Use cases built on the domain model and the outbound ports:
//!
//! - [`quote`]: rate-limited, retrying quote gateway
//! - [`catalog`]: static and generated cycles, ranked by history
//! - [`history`]: durable per-path statistics
//! - [`scanner`]: bounded-concurrency path walks
//! - [`sizing`]: Kelly sizing and capital allocation
//! - [`risk`]: the circuit breaker
//! - [`wallet`]: signing identity selection
//! - [`policy`]: daily trade caps
//! - [`orchestration`]: the cycle loop tying it together

pub mod catalog;
pub mod history;
pub mod orchestration;
pub mod policy;
pub mod quote;
pub mod risk;
pub mod scanner;
pub mod sizing;
pub mod wallet;
