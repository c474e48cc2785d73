//! Notifier port for engine events.
//!
//! The engine reports what it found and what it did through this port.
//! Delivery (chat bots, dashboards, reports) lives outside the crate.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{breaker::BreakerPhase, id::PathKey, opportunity::Opportunity};

/// Events emitted by the engine.
#[derive(Debug, Clone)]
pub enum Event {
    /// A walked path cleared its profit threshold.
    OpportunityFound(Box<Opportunity>),
    /// A trade outcome was fed back into history and the circuit breaker.
    TradeRecorded(TradeEvent),
    /// The circuit breaker changed phase.
    CircuitBreakerTransitioned {
        /// Phase before the transition.
        from: BreakerPhase,
        /// Phase after the transition.
        to: BreakerPhase,
    },
    /// A scan cycle finished.
    CycleCompleted(CycleSummary),
}

/// Outcome of one executed (or simulated) trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeEvent {
    pub path: PathKey,
    pub success: bool,
    pub profit_percent: f64,
    pub amount: Decimal,
    pub simulated: bool,
}

/// Aggregate counts for one scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleSummary {
    /// Paths walked to completion.
    pub checked: usize,
    /// Paths that failed a hop quote.
    pub failed: usize,
    /// Paths skipped by the cycle deadline.
    pub skipped: usize,
    /// Opportunities found.
    pub opportunities: usize,
    /// Trades submitted to the venue.
    pub trades: usize,
    /// Trades the venue reported as successful.
    pub successful: usize,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }
}

/// Trait for notification handlers.
///
/// Implementations must be thread-safe and return quickly; slow delivery
/// should be spawned onto the runtime.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// Logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::OpportunityFound(opp) => {
                info!(
                    path = %opp.path().key(),
                    input = opp.input_amount(),
                    output = opp.output_amount(),
                    profit_percent = opp.profit_percent(),
                    "Opportunity found"
                );
            }
            Event::TradeRecorded(e) => {
                info!(
                    path = %e.path,
                    success = e.success,
                    profit_percent = e.profit_percent,
                    amount = %e.amount,
                    simulated = e.simulated,
                    "Trade recorded"
                );
            }
            Event::CircuitBreakerTransitioned { from, to } => {
                warn!(from = %from, to = %to, "Circuit breaker transitioned");
            }
            Event::CycleCompleted(s) => {
                info!(
                    checked = s.checked,
                    failed = s.failed,
                    skipped = s.skipped,
                    opportunities = s.opportunities,
                    trades = s.trades,
                    successful = s.successful,
                    elapsed_ms = s.elapsed.as_millis() as u64,
                    "Cycle completed"
                );
            }
        }
    }
}
