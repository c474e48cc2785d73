//! Engine state shared by the orchestrator and status commands.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::application::catalog::{PathCatalog, ScanMode};
use crate::application::history::PathHistoryStore;
use crate::application::quote::QuoteGateway;
use crate::application::risk::CircuitBreaker;
use crate::application::scanner::OpportunityScanner;
use crate::application::sizing::PositionSizer;
use crate::application::wallet::WalletPool;
use crate::port::outbound::{notifier::NotifierRegistry, policy::TradePolicy, venue::SwapVenue};

/// Orchestrator tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Period of the scan loop.
    pub scan_interval: Duration,
    /// Capital (base-token UI units) shared by one cycle's trades.
    pub total_capital: Decimal,
    /// Timeout for one venue execution.
    pub execution_timeout: Duration,
    /// Simulate executions instead of broadcasting.
    pub dry_run: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(30),
            total_capital: Decimal::ONE_THOUSAND,
            execution_timeout: Duration::from_secs(30),
            dry_run: true,
        }
    }
}

/// Every long-lived component of the engine.
///
/// Path history and the circuit breaker are process-wide; they live here
/// rather than in globals so tests can build isolated engines.
#[derive(Clone)]
pub struct EngineContext {
    pub gateway: Arc<QuoteGateway>,
    pub catalog: Arc<PathCatalog>,
    pub history: Arc<PathHistoryStore>,
    pub scanner: Arc<OpportunityScanner>,
    pub sizer: Arc<PositionSizer>,
    pub breaker: Arc<CircuitBreaker>,
    pub wallets: Arc<WalletPool>,
    pub venue: Arc<dyn SwapVenue>,
    pub policy: Arc<dyn TradePolicy>,
    pub notifiers: Arc<NotifierRegistry>,
    pub settings: EngineSettings,
}

impl EngineContext {
    /// Whether scans feed path history.
    #[must_use]
    pub fn records_history(&self) -> bool {
        self.catalog.mode() == ScanMode::Dynamic
    }
}
