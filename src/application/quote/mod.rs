//! Rate-limited, retrying access to venue quotes.

mod gateway;
mod limiter;

pub use gateway::{GatewaySettings, GatewayStats, QuoteFailure, QuoteGateway};
pub use limiter::RateLimiter;
