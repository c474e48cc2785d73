//! A fully wired engine over scripted collaborators.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::application::catalog::{CatalogSettings, PathCatalog, ScanMode};
use crate::application::history::PathHistoryStore;
use crate::application::orchestration::{EngineContext, EngineSettings, Orchestrator};
use crate::application::quote::{GatewaySettings, QuoteGateway};
use crate::application::risk::CircuitBreaker;
use crate::application::scanner::{OpportunityScanner, ScannerSettings};
use crate::application::sizing::{PositionSizer, SizingSettings};
use crate::application::wallet::WalletPool;
use crate::domain::{breaker::BreakerThresholds, path::Path, token::TokenPolicy};
use crate::port::outbound::{
    cost::FixedCostSignal,
    notifier::{Notifier, NotifierRegistry},
    policy::{TradePolicy, Unrestricted},
};

use super::balance::StaticBalanceOracle;
use super::domain::{cycle, token, wallet};
use super::store::MemoryStore;
use super::venue::ScriptedVenue;

/// Engine plus handles on its scripted collaborators.
pub struct TestEngine {
    pub venue: Arc<ScriptedVenue>,
    pub store: Arc<MemoryStore>,
    pub oracle: Arc<StaticBalanceOracle>,
    pub orchestrator: Orchestrator,
}

impl TestEngine {
    pub fn builder() -> TestEngineBuilder {
        TestEngineBuilder::default()
    }

    pub fn context(&self) -> &EngineContext {
        self.orchestrator.context()
    }
}

pub struct TestEngineBuilder {
    venue: ScriptedVenue,
    paths: Vec<Path>,
    wallets: Vec<String>,
    catalog: CatalogSettings,
    sizing: SizingSettings,
    engine: EngineSettings,
    policy: Arc<dyn TradePolicy>,
    notifiers: Vec<Box<dyn Notifier>>,
    store: Arc<MemoryStore>,
    breaker_enabled: bool,
    wallet_balance: u64,
}

impl Default for TestEngineBuilder {
    fn default() -> Self {
        Self {
            venue: ScriptedVenue::new(),
            paths: Vec::new(),
            wallets: Vec::new(),
            catalog: CatalogSettings::default(),
            sizing: SizingSettings::default(),
            engine: EngineSettings {
                scan_interval: Duration::from_secs(1),
                ..EngineSettings::default()
            },
            policy: Arc::new(Unrestricted),
            notifiers: Vec::new(),
            store: Arc::new(MemoryStore::new()),
            breaker_enabled: true,
            wallet_balance: u64::MAX,
        }
    }
}

impl TestEngineBuilder {
    pub fn rate(mut self, input: &str, output: &str, rate: f64) -> Self {
        self.venue = self.venue.with_rate(input, output, rate);
        self
    }

    /// Delay every quote by `delay`.
    pub fn quote_delay(mut self, delay: Duration) -> Self {
        self.venue = self.venue.with_quote_delay(delay);
        self
    }

    /// Static cycle through `symbols`.
    pub fn path(mut self, symbols: &[&str], min_profit_percent: f64) -> Self {
        self.paths.push(cycle(symbols, min_profit_percent));
        self
    }

    pub fn wallets(mut self, ids: &[&str]) -> Self {
        self.wallets = ids.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Generate cycles from `base` over `universe`.
    pub fn dynamic(mut self, base: &str, universe: &[&str]) -> Self {
        self.catalog.mode = ScanMode::Dynamic;
        self.catalog.base = Some(token(base));
        self.catalog.universe = universe.iter().map(|s| token(s)).collect();
        self
    }

    pub fn sizing(mut self, sizing: SizingSettings) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn live(mut self) -> Self {
        self.engine.dry_run = false;
        self
    }

    pub fn total_capital(mut self, capital: Decimal) -> Self {
        self.engine.total_capital = capital;
        self
    }

    pub fn policy(mut self, policy: Arc<dyn TradePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn store(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn breaker_enabled(mut self, enabled: bool) -> Self {
        self.breaker_enabled = enabled;
        self
    }

    pub fn wallet_balance(mut self, balance: u64) -> Self {
        self.wallet_balance = balance;
        self
    }

    pub fn build(self) -> TestEngine {
        let venue = Arc::new(self.venue);
        let oracle = Arc::new(StaticBalanceOracle::new(self.wallet_balance));
        let store = self.store;

        let mut registry = NotifierRegistry::new();
        for notifier in self.notifiers {
            registry.register(notifier);
        }
        let notifiers = Arc::new(registry);

        let policy = TokenPolicy::default();
        let gateway = Arc::new(QuoteGateway::new(
            venue.clone(),
            policy.clone(),
            GatewaySettings {
                min_spacing: Duration::ZERO,
                ..GatewaySettings::default()
            },
        ));
        let history = Arc::new(PathHistoryStore::new(store.clone()));
        let catalog = Arc::new(PathCatalog::new(self.paths, &policy, self.catalog));
        let scanner = Arc::new(OpportunityScanner::new(
            gateway.clone(),
            Arc::new(FixedCostSignal::default()),
            ScannerSettings::default(),
        ));
        let breaker = Arc::new(CircuitBreaker::new(
            self.breaker_enabled,
            BreakerThresholds::default(),
            store.clone(),
            notifiers.clone(),
        ));
        let wallets = Arc::new(WalletPool::new(
            self.wallets.iter().map(|id| wallet(id)).collect(),
            oracle.clone(),
        ));

        let context = EngineContext {
            gateway,
            catalog,
            history,
            scanner,
            sizer: Arc::new(PositionSizer::new(self.sizing)),
            breaker,
            wallets,
            venue: venue.clone(),
            policy: self.policy,
            notifiers,
            settings: self.engine,
        };

        TestEngine {
            venue,
            store,
            oracle,
            orchestrator: Orchestrator::new(context),
        }
    }
}
