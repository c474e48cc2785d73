//! HTTP adapters for the swap venue and balance oracle.

mod balance;
mod client;
mod dto;
mod venue;

pub use balance::HttpBalanceOracle;
pub use client::HttpSettings;
pub use venue::HttpSwapVenue;
