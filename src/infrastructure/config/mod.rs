//! Infrastructure configuration modules.

pub mod breaker;
pub mod catalog;
pub mod logging;
pub mod policy;
pub mod quote;
pub mod scanner;
pub mod settings;
pub mod sizing;
pub mod storage;
pub mod token;
pub mod venue;
pub mod wallet;

pub use settings::Config;
