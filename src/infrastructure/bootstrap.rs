//! Composition root: builds an [`EngineContext`] from [`Config`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::file_store::FileSnapshotStore;
use crate::adapter::outbound::http::{HttpBalanceOracle, HttpSettings, HttpSwapVenue};
use crate::application::catalog::PathCatalog;
use crate::application::history::PathHistoryStore;
use crate::application::orchestration::EngineContext;
use crate::application::quote::{GatewaySettings, QuoteGateway};
use crate::application::risk::CircuitBreaker;
use crate::application::scanner::{OpportunityScanner, ScannerSettings};
use crate::application::sizing::{PositionSizer, SizingSettings};
use crate::application::wallet::WalletPool;
use crate::domain::breaker::BreakerThresholds;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::balance::BalanceOracle;
use crate::port::outbound::cost::FixedCostSignal;
use crate::port::outbound::notifier::{LogNotifier, NotifierRegistry};
use crate::port::outbound::store::SnapshotStore;
use crate::port::outbound::venue::SwapVenue;

/// External collaborators the engine is wired against.
pub struct Collaborators {
    pub venue: Arc<dyn SwapVenue>,
    pub oracle: Arc<dyn BalanceOracle>,
    pub store: Arc<dyn SnapshotStore>,
}

impl Collaborators {
    /// HTTP venue and balance oracle plus the file snapshot store.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = HttpSettings::from(&config.venue);
        Ok(Self {
            venue: Arc::new(HttpSwapVenue::new(&config.venue.base_url, http)?),
            oracle: Arc::new(HttpBalanceOracle::new(config.venue.balance_url(), http)?),
            store: snapshot_store(config),
        })
    }
}

/// File snapshot store under the configured state directory.
#[must_use]
pub fn snapshot_store(config: &Config) -> Arc<dyn SnapshotStore> {
    Arc::new(FileSnapshotStore::new(config.storage.dir.clone()))
}

/// Path catalog from configured tokens, paths and token policy.
///
/// # Errors
///
/// Returns an error if tokens, paths or the catalog do not resolve.
pub fn build_catalog(config: &Config) -> Result<PathCatalog> {
    let registry = config.token_registry()?;
    Ok(PathCatalog::new(
        config.static_paths(&registry)?,
        &config.policy.token_policy(),
        config.catalog.settings(&registry)?,
    ))
}

/// Build the notifier registry.
pub(crate) fn build_notifier_registry() -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Wire the engine from configuration over the production adapters.
///
/// # Errors
///
/// Returns an error if the configuration does not resolve or a URL is invalid.
pub async fn build_context(config: &Config) -> Result<EngineContext> {
    let collaborators = Collaborators::from_config(config)?;
    build_context_with(config, collaborators, build_notifier_registry()).await
}

/// Wire the engine from configuration over the given collaborators.
///
/// Persisted path history and breaker state are loaded from the store.
///
/// # Errors
///
/// Returns an error if tokens, paths or the catalog do not resolve.
pub async fn build_context_with(
    config: &Config,
    collaborators: Collaborators,
    notifiers: NotifierRegistry,
) -> Result<EngineContext> {
    let Collaborators {
        venue,
        oracle,
        store,
    } = collaborators;
    let notifiers = Arc::new(notifiers);

    let catalog = Arc::new(build_catalog(config)?);
    let gateway = Arc::new(QuoteGateway::new(
        venue.clone(),
        config.policy.token_policy(),
        GatewaySettings::from(&config.quote),
    ));
    let history = Arc::new(PathHistoryStore::load(store.clone()).await);
    let scanner = Arc::new(OpportunityScanner::new(
        gateway.clone(),
        Arc::new(FixedCostSignal::new(config.venue.fee_percent_per_hop)),
        ScannerSettings::from(&config.scanner),
    ));
    let breaker = Arc::new(
        CircuitBreaker::load(
            config.circuit_breaker.enabled,
            BreakerThresholds::from(&config.circuit_breaker),
            store,
            notifiers.clone(),
        )
        .await,
    );
    let wallets = Arc::new(WalletPool::new(config.wallet_entries(), oracle));

    info!(
        venue = venue.name(),
        tokens = config.tokens.len(),
        wallets = wallets.len(),
        history_paths = history.len(),
        notifiers = notifiers.len(),
        "Engine wired"
    );

    Ok(EngineContext {
        gateway,
        catalog,
        history,
        scanner,
        sizer: Arc::new(PositionSizer::new(SizingSettings::from(&config.sizing))),
        breaker,
        wallets,
        venue,
        policy: Arc::new(config.policy.trade_policy()),
        notifiers,
        settings: config.engine_settings(),
    })
}
