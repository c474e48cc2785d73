//! Signing identity selection.

mod pool;

pub use pool::WalletPool;
