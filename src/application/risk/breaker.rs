//! Process-wide circuit breaker.
//!
//! Wraps [`BreakerState`] with persistence and event fan-out. Every
//! transition is saved before it is reported; a failed save is logged and
//! the in-memory state stays authoritative.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::domain::breaker::{BreakerState, BreakerThresholds, BreakerTransition};
use crate::port::outbound::notifier::{Event, NotifierRegistry};
use crate::port::outbound::store::{SnapshotStore, CIRCUIT_BREAKER_KEY};

/// Circuit breaker shared by the orchestrator and status output.
pub struct CircuitBreaker {
    state: RwLock<BreakerState>,
    thresholds: BreakerThresholds,
    store: Arc<dyn SnapshotStore>,
    notifiers: Arc<NotifierRegistry>,
    write_gate: AsyncMutex<()>,
}

impl CircuitBreaker {
    /// Fresh breaker in `normal`.
    #[must_use]
    pub fn new(
        enabled: bool,
        thresholds: BreakerThresholds,
        store: Arc<dyn SnapshotStore>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        Self::with_state(BreakerState::new(enabled), thresholds, store, notifiers)
    }

    fn with_state(
        state: BreakerState,
        thresholds: BreakerThresholds,
        store: Arc<dyn SnapshotStore>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            thresholds,
            store,
            notifiers,
            write_gate: AsyncMutex::new(()),
        }
    }

    /// Load the persisted state, apply the configured enabled flag, then
    /// run one recovery check.
    ///
    /// A missing, unreadable or inconsistent snapshot starts a fresh breaker.
    pub async fn load(
        enabled: bool,
        thresholds: BreakerThresholds,
        store: Arc<dyn SnapshotStore>,
        notifiers: Arc<NotifierRegistry>,
    ) -> Self {
        let mut state = match store.load(CIRCUIT_BREAKER_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<BreakerState>(&bytes) {
                Ok(state) if !state.is_consistent() => {
                    warn!(
                        status = %state.status(),
                        level = state.level(),
                        multiplier = state.position_size_multiplier(),
                        "Inconsistent circuit breaker snapshot, starting fresh"
                    );
                    BreakerState::new(enabled)
                }
                Ok(state) => {
                    info!(
                        status = %state.status(),
                        level = state.level(),
                        consecutive_losses = state.consecutive_losses(),
                        "Circuit breaker state loaded"
                    );
                    state
                }
                Err(e) => {
                    warn!(error = %e, "Corrupt circuit breaker snapshot, starting fresh");
                    BreakerState::new(enabled)
                }
            },
            Ok(None) => BreakerState::new(enabled),
            Err(e) => {
                warn!(error = %e, "Failed to load circuit breaker state, starting fresh");
                BreakerState::new(enabled)
            }
        };
        state.set_enabled(enabled);

        let breaker = Self::with_state(state, thresholds, store, notifiers);
        breaker.check_recovery_progress().await;
        breaker
    }

    /// Feed a trade outcome into the breaker.
    pub async fn update(&self, success: bool, profit_percent: f64) -> Option<BreakerTransition> {
        self.update_at(success, profit_percent, Utc::now()).await
    }

    /// [`update`](Self::update) with an explicit clock.
    pub async fn update_at(
        &self,
        success: bool,
        profit_percent: f64,
        now: DateTime<Utc>,
    ) -> Option<BreakerTransition> {
        let thresholds = self.thresholds;
        self.mutate(|state| state.update(success, profit_percent, now, &thresholds))
            .await
    }

    /// Move a halted breaker into recovery once its deadline has passed.
    pub async fn check_recovery_progress(&self) -> Option<BreakerTransition> {
        self.check_recovery_progress_at(Utc::now()).await
    }

    pub async fn check_recovery_progress_at(&self, now: DateTime<Utc>) -> Option<BreakerTransition> {
        self.mutate(|state| state.check_recovery(now)).await
    }

    /// Operator reset to `normal`.
    pub async fn reset(&self) -> Option<BreakerTransition> {
        let now = Utc::now();
        self.mutate(|state| state.reset(now)).await
    }

    #[must_use]
    pub fn is_trading_allowed(&self) -> bool {
        self.state.read().is_trading_allowed()
    }

    #[must_use]
    pub fn position_size_multiplier(&self) -> f64 {
        self.state.read().position_size_multiplier()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> BreakerState {
        self.state.read().clone()
    }

    #[must_use]
    pub const fn thresholds(&self) -> &BreakerThresholds {
        &self.thresholds
    }

    async fn mutate(
        &self,
        apply: impl FnOnce(&mut BreakerState) -> Option<BreakerTransition>,
    ) -> Option<BreakerTransition> {
        let _gate = self.write_gate.lock().await;
        let (transition, bytes) = {
            let mut state = self.state.write();
            let before = state.clone();
            let transition = apply(&mut state);
            let bytes = (*state != before).then(|| serde_json::to_vec(&*state));
            (transition, bytes)
        };

        match bytes {
            Some(Ok(bytes)) => {
                if let Err(e) = self.store.save(CIRCUIT_BREAKER_KEY, &bytes).await {
                    warn!(error = %e, "Failed to persist circuit breaker state");
                }
            }
            Some(Err(e)) => warn!(error = %e, "Failed to encode circuit breaker state"),
            None => {}
        }

        if let Some(t) = transition {
            info!(from = %t.from, to = %t.to, "Circuit breaker transition");
            self.notifiers.notify_all(Event::CircuitBreakerTransitioned {
                from: t.from,
                to: t.to,
            });
        }
        transition
    }
}
