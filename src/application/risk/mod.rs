//! Risk controls.

mod breaker;

pub use breaker::CircuitBreaker;
