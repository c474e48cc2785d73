//! Cycle logic and the periodic scan loop.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::context::EngineContext;
use crate::application::quote::GatewayStats;
use crate::application::scanner::{ScanReport, WalkError};
use crate::application::sizing::allocate_across_paths;
use crate::domain::{
    id::{PathKey, WalletId},
    opportunity::Opportunity,
};
use crate::port::outbound::notifier::{CycleSummary, Event, TradeEvent};
use crate::port::outbound::policy::PolicyDenial;

/// Why a whole cycle was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A previous cycle is still running.
    InFlight,
    /// The circuit breaker halts trading.
    CircuitBreaker,
}

/// Why one opportunity was not traded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TradeSkipReason {
    /// The breaker halted trading earlier in this cycle.
    CircuitBreaker,
    /// Sizing, allocation and breaker multiplier left nothing to trade.
    ZeroSize,
    Policy { detail: String },
    NoWallet,
    /// The re-quote at the sized amount failed.
    Requote { detail: String },
    /// The re-quote at the sized amount no longer clears the threshold.
    BelowThreshold { profit_percent: f64, threshold: f64 },
}

/// An opportunity that was not traded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSkip {
    pub path: PathKey,
    #[serde(flatten)]
    pub reason: TradeSkipReason,
}

/// A submitted trade and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub path: PathKey,
    pub wallet: WalletId,
    /// Capital committed, base-token UI units.
    pub amount: Decimal,
    pub success: bool,
    /// Recorded profit; zero for failed executions.
    pub profit_percent: f64,
    pub simulated: bool,
    pub tx_ref: Option<String>,
}

/// Everything one completed cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub scan: ScanReport,
    pub trades: Vec<TradeRecord>,
    pub skipped: Vec<TradeSkip>,
    pub summary: CycleSummary,
    /// Cumulative quote gateway counters at the end of the cycle.
    pub gateway: GatewayStats,
}

/// Result of [`Orchestrator::run_cycle`].
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Completed(Box<CycleReport>),
}

/// Clears the in-flight flag when a cycle ends, including when its future
/// is dropped mid-cycle.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Periodic control loop.
pub struct Orchestrator {
    ctx: EngineContext,
    in_flight: AtomicBool,
}

impl Orchestrator {
    #[must_use]
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Run cycles every `scan_interval` until `shutdown` flips to true.
    ///
    /// Ticks missed while a cycle runs are dropped, not replayed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.ctx.settings.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_secs = self.ctx.settings.scan_interval.as_secs(),
            dry_run = self.ctx.settings.dry_run,
            "Scan loop started"
        );

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        CycleOutcome::Skipped(reason) => {
                            debug!(reason = ?reason, "Cycle skipped");
                        }
                        CycleOutcome::Completed(_) => {}
                    }
                }
            }
        }
    }

    /// Run one scan-and-trade cycle.
    ///
    /// Returns [`SkipReason::InFlight`] without doing anything when another
    /// cycle is running.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return CycleOutcome::Skipped(SkipReason::InFlight);
        };
        self.cycle().await
    }

    async fn cycle(&self) -> CycleOutcome {
        let started = Instant::now();
        let ctx = &self.ctx;

        ctx.breaker.check_recovery_progress().await;
        if !ctx.breaker.is_trading_allowed() {
            warn!("Circuit breaker halts trading, cycle skipped");
            return CycleOutcome::Skipped(SkipReason::CircuitBreaker);
        }

        let candidates = ctx.catalog.candidates(&ctx.history, Utc::now());
        let scan = ctx.scanner.scan(candidates).await;
        for opportunity in &scan.opportunities {
            ctx.notifiers
                .notify_all(Event::OpportunityFound(Box::new(opportunity.clone())));
        }

        let now = Utc::now();
        let scored: Vec<(PathKey, f64)> = scan
            .opportunities
            .iter()
            .map(|o| {
                let record = ctx.history.get(o.path().key());
                let score = ctx.sizer.allocation_score(record.as_ref(), o.profit_percent(), now);
                (o.path().key().clone(), score)
            })
            .collect();
        let allocations = allocate_across_paths(
            &scored,
            ctx.settings.total_capital,
            ctx.sizer.settings().allocation_bounds(),
        );

        let mut trades = Vec::new();
        let mut skipped = Vec::new();
        for (opportunity, (_, allocation)) in scan.opportunities.iter().zip(allocations) {
            match self.trade(opportunity, allocation).await {
                Ok(record) => trades.push(record),
                Err(reason) => {
                    debug!(path = %opportunity.path().key(), reason = ?reason, "Opportunity not traded");
                    skipped.push(TradeSkip {
                        path: opportunity.path().key().clone(),
                        reason,
                    });
                }
            }
        }
        self.record_walks(&scan, &trades).await;

        let summary = CycleSummary {
            checked: scan.checked,
            failed: scan.failed,
            skipped: scan.skipped,
            opportunities: scan.opportunities.len(),
            trades: trades.len(),
            successful: trades.iter().filter(|t| t.success).count(),
            elapsed: started.elapsed(),
        };
        ctx.notifiers.notify_all(Event::CycleCompleted(summary.clone()));

        let gateway = ctx.gateway.stats();
        debug!(
            calls = gateway.calls,
            rate_limited = gateway.rate_limited,
            timeouts = gateway.timeouts,
            failures = gateway.failures,
            "Quote gateway counters"
        );

        CycleOutcome::Completed(Box::new(CycleReport {
            scan,
            trades,
            skipped,
            summary,
            gateway,
        }))
    }

    /// Record scan outcomes for walked paths that were not traded.
    ///
    /// Only dynamic scans feed history from walks. A traded path already has
    /// its execution outcome recorded, so each path lands in history at most
    /// once per cycle.
    async fn record_walks(&self, scan: &ScanReport, trades: &[TradeRecord]) {
        if !self.ctx.records_history() {
            return;
        }
        let traded: HashSet<&PathKey> = trades.iter().map(|t| &t.path).collect();
        for walked in scan.walked.iter().filter(|w| !traded.contains(&w.key)) {
            self.ctx
                .history
                .record_attempt(&walked.key, walked.cleared, walked.profit_percent)
                .await;
        }
    }

    async fn trade(
        &self,
        opportunity: &Opportunity,
        allocation: Decimal,
    ) -> Result<TradeRecord, TradeSkipReason> {
        let ctx = &self.ctx;
        let path = opportunity.path();

        // The breaker may have tripped on an earlier trade this cycle.
        if !ctx.breaker.is_trading_allowed() {
            return Err(TradeSkipReason::CircuitBreaker);
        }

        let record = ctx.history.get(path.key());
        let sized = ctx.sizer.size(record.as_ref(), Utc::now());
        let multiplier =
            Decimal::from_f64(ctx.breaker.position_size_multiplier()).unwrap_or(Decimal::ZERO);
        let amount = (sized.amount * multiplier).min(allocation);
        if amount <= Decimal::ZERO {
            return Err(TradeSkipReason::ZeroSize);
        }

        ctx.policy
            .admit(amount)
            .map_err(|e: PolicyDenial| TradeSkipReason::Policy {
                detail: e.to_string(),
            })?;

        let atomic = path
            .base()
            .to_atomic(amount)
            .filter(|a| *a > 0)
            .ok_or(TradeSkipReason::ZeroSize)?;

        let wallet = ctx
            .wallets
            .get_best_wallet(opportunity, atomic)
            .await
            .ok_or(TradeSkipReason::NoWallet)?;

        let requoted = ctx
            .scanner
            .walk_path(path, atomic)
            .await
            .map_err(|e: WalkError| TradeSkipReason::Requote {
                detail: e.to_string(),
            })?;
        let threshold = ctx.scanner.threshold(path);
        if requoted.profit_percent() < threshold {
            return Err(TradeSkipReason::BelowThreshold {
                profit_percent: requoted.profit_percent(),
                threshold,
            });
        }

        let simulated = ctx.settings.dry_run;
        let execution = timeout(
            ctx.settings.execution_timeout,
            ctx.venue.execute(requoted.quotes(), &wallet, simulated),
        )
        .await;
        let (success, tx_ref) = match execution {
            Ok(Ok(receipt)) => (receipt.success, receipt.tx_ref),
            Ok(Err(e)) => {
                warn!(path = %path.key(), wallet = %wallet.id(), error = %e, "Execution failed");
                (false, None)
            }
            Err(_) => {
                warn!(path = %path.key(), wallet = %wallet.id(), "Execution timed out");
                (false, None)
            }
        };
        let profit_percent = if success {
            requoted.profit_percent()
        } else {
            0.0
        };

        ctx.history
            .record_attempt(path.key(), success, profit_percent)
            .await;
        ctx.breaker.update(success, profit_percent).await;
        ctx.wallets.update_after_trade(wallet.id(), &requoted).await;
        ctx.policy.record_trade(amount);

        info!(
            path = %path.key(),
            wallet = %wallet.id(),
            amount = %amount,
            success,
            profit_percent,
            simulated,
            "Trade recorded"
        );
        ctx.notifiers.notify_all(Event::TradeRecorded(TradeEvent {
            path: path.key().clone(),
            success,
            profit_percent,
            amount,
            simulated,
        }));

        Ok(TradeRecord {
            path: path.key().clone(),
            wallet: wallet.id().clone(),
            amount,
            success,
            profit_percent,
            simulated,
            tx_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::engine::TestEngine;

    fn profitable() -> TestEngine {
        TestEngine::builder()
            .rate("usdc", "sol", 0.01)
            .rate("sol", "usdc", 102.0)
            .path(&["USDC", "SOL"], 0.5)
            .wallets(&["w1", "w2"])
            .build()
    }

    #[tokio::test]
    async fn test_cycle_trades_profitable_path() {
        let engine = profitable();
        let CycleOutcome::Completed(report) = engine.orchestrator.run_cycle().await else {
            panic!("cycle skipped");
        };
        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert!(trade.success);
        assert!(trade.simulated);
        assert!((trade.profit_percent - 2.0).abs() < 1e-6);
        assert_eq!(engine.venue.simulated_calls(), 1);
        // Two scan quotes plus two re-quotes at the sized amount.
        assert_eq!(report.gateway.calls, 4);

        let key = PathKey::from("USDC->SOL->USDC");
        assert_eq!(engine.context().history.get(&key).unwrap().successes(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_cycle_is_skipped() {
        let engine = profitable();
        engine.orchestrator.in_flight.store(true, Ordering::SeqCst);
        assert!(matches!(
            engine.orchestrator.run_cycle().await,
            CycleOutcome::Skipped(SkipReason::InFlight)
        ));
        assert_eq!(engine.venue.quote_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cycle_releases_in_flight() {
        let engine = TestEngine::builder()
            .rate("usdc", "sol", 0.01)
            .rate("sol", "usdc", 102.0)
            .path(&["USDC", "SOL"], 0.5)
            .wallets(&["w1"])
            .quote_delay(std::time::Duration::from_secs(2))
            .build();

        let abandoned = timeout(
            std::time::Duration::from_millis(500),
            engine.orchestrator.run_cycle(),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(!engine.orchestrator.in_flight.load(Ordering::SeqCst));

        assert!(matches!(
            engine.orchestrator.run_cycle().await,
            CycleOutcome::Completed(_)
        ));
    }

    #[tokio::test]
    async fn test_halted_breaker_skips_before_scanning() {
        let engine = profitable();
        for _ in 0..9 {
            engine.context().breaker.update(false, -1.0).await;
        }
        assert!(matches!(
            engine.orchestrator.run_cycle().await,
            CycleOutcome::Skipped(SkipReason::CircuitBreaker)
        ));
        assert_eq!(engine.venue.quote_calls(), 0);
    }
}
