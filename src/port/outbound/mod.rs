//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the engine's external collaborators: the swap
//! venue, durable snapshot storage, wallet balances, cost signals, trade
//! caps, and event notification.

pub mod balance;
pub mod cost;
pub mod notifier;
pub mod policy;
pub mod store;
pub mod venue;
