//! Outbound adapters (driven side).

pub mod file_store;
pub mod http;
