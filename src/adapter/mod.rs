//! Adapters: the CLI on the inbound side, HTTP and file implementations of
//! the outbound ports.

pub mod inbound;
pub mod outbound;
