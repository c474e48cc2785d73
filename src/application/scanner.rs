//! Opportunity scanner.
//!
//! Walks candidate cycles hop by hop through the [`QuoteGateway`], with a
//! bounded number of paths in flight and a deadline for the whole pass.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::application::quote::{QuoteFailure, QuoteGateway};
use crate::domain::{
    id::PathKey,
    opportunity::{Opportunity, OpportunityBuildError},
    path::Path,
};
use crate::port::outbound::cost::CostSignal;

/// Scanner tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannerSettings {
    /// Paths walked concurrently.
    pub concurrency: usize,
    /// Wall-clock budget for one pass.
    pub cycle_deadline: Duration,
    /// Amount of the base token (UI units) pushed through each path.
    pub scan_amount: Decimal,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            cycle_deadline: Duration::from_secs(20),
            scan_amount: Decimal::ONE_HUNDRED,
        }
    }
}

/// A path walk that did not produce quotes for every hop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkError {
    #[error("scan amount is not representable in the base token")]
    InvalidAmount,

    #[error("hop {hop} failed: {failure}")]
    Hop { hop: usize, failure: QuoteFailure },

    #[error(transparent)]
    Build(#[from] OpportunityBuildError),
}

/// Outcome of scanning one path.
#[derive(Debug, Clone)]
pub enum PathScan {
    /// Fully walked and above threshold.
    Opportunity(Box<Opportunity>),
    /// Fully walked but not profitable enough.
    BelowThreshold {
        key: PathKey,
        profit_percent: f64,
        threshold: f64,
    },
    /// A hop could not be quoted.
    Failed { key: PathKey, error: WalkError },
    /// Not started or not finished before the deadline.
    Skipped { key: PathKey },
}

impl PathScan {
    /// Outcome of a fully walked path.
    #[must_use]
    pub fn walked(&self) -> Option<WalkedPath> {
        match self {
            Self::Opportunity(o) => Some(WalkedPath {
                key: o.path().key().clone(),
                cleared: true,
                profit_percent: o.profit_percent(),
            }),
            Self::BelowThreshold {
                key,
                profit_percent,
                ..
            } => Some(WalkedPath {
                key: key.clone(),
                cleared: false,
                profit_percent: *profit_percent,
            }),
            Self::Failed { .. } | Self::Skipped { .. } => None,
        }
    }
}

/// A path walked to completion, with whether it cleared its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkedPath {
    pub key: PathKey,
    pub cleared: bool,
    pub profit_percent: f64,
}

/// Result of one scan pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Paths walked to completion.
    pub checked: usize,
    pub below_threshold: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Sorted by profit percent, best first.
    pub opportunities: Vec<Opportunity>,
    /// Every fully walked path, in completion order.
    #[serde(skip)]
    pub walked: Vec<WalkedPath>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Walks paths and emits opportunities.
pub struct OpportunityScanner {
    gateway: Arc<QuoteGateway>,
    cost: Arc<dyn CostSignal>,
    settings: ScannerSettings,
}

impl OpportunityScanner {
    #[must_use]
    pub fn new(
        gateway: Arc<QuoteGateway>,
        cost: Arc<dyn CostSignal>,
        settings: ScannerSettings,
    ) -> Self {
        Self {
            gateway,
            cost,
            settings,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    /// Minimum profit percent a path must reach, cost signal included.
    #[must_use]
    pub fn threshold(&self, path: &Path) -> f64 {
        let extra = self.cost.extra_profit_percent(path);
        let extra = if extra.is_finite() { extra.max(0.0) } else { 0.0 };
        path.min_profit_percent() + extra
    }

    /// Quote every hop of `path` in order, feeding each hop's output into
    /// the next. Stops at the first failed hop.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::Hop`] naming the first hop that failed.
    pub async fn walk_path(&self, path: &Path, amount: u64) -> Result<Opportunity, WalkError> {
        if amount == 0 {
            return Err(WalkError::InvalidAmount);
        }
        let mut quotes = Vec::with_capacity(path.hop_count());
        let mut carried = amount;
        for (hop, (input, output)) in path.hops().enumerate() {
            let quote = self
                .gateway
                .get_quote(input, output, carried, path.max_slippage_bps())
                .await
                .map_err(|failure| WalkError::Hop { hop, failure })?;
            carried = quote.out_amount();
            quotes.push(quote);
        }

        Ok(Opportunity::builder()
            .path(path.clone())
            .input_amount(amount)
            .quotes(quotes)
            .build()?)
    }

    /// Walk one path at the scan amount and classify the result.
    pub async fn scan_path(&self, path: &Path) -> PathScan {
        let Some(amount) = path.base().to_atomic(self.settings.scan_amount) else {
            return PathScan::Failed {
                key: path.key().clone(),
                error: WalkError::InvalidAmount,
            };
        };

        match self.walk_path(path, amount).await {
            Ok(opportunity) => {
                let threshold = self.threshold(path);
                if opportunity.profit_percent() >= threshold {
                    PathScan::Opportunity(Box::new(opportunity))
                } else {
                    PathScan::BelowThreshold {
                        key: path.key().clone(),
                        profit_percent: opportunity.profit_percent(),
                        threshold,
                    }
                }
            }
            Err(error) => {
                debug!(path = %path.key(), error = %error, "Path walk failed");
                PathScan::Failed {
                    key: path.key().clone(),
                    error,
                }
            }
        }
    }

    /// Scan all `paths` under the concurrency bound and cycle deadline.
    ///
    /// Nothing is written to path history here; callers decide which walks
    /// to record from [`ScanReport::walked`].
    pub async fn scan(&self, paths: Vec<Path>) -> ScanReport {
        let started = Instant::now();
        let deadline = started + self.settings.cycle_deadline;

        let results: Vec<PathScan> = stream::iter(paths)
            .map(|path| async move {
                if Instant::now() >= deadline {
                    return PathScan::Skipped {
                        key: path.key().clone(),
                    };
                }
                match timeout_at(deadline, self.scan_path(&path)).await {
                    Ok(scan) => scan,
                    Err(_) => PathScan::Skipped {
                        key: path.key().clone(),
                    },
                }
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut report = ScanReport::default();
        for scan in results {
            if let Some(walked) = scan.walked() {
                report.walked.push(walked);
            }
            match scan {
                PathScan::Opportunity(opportunity) => {
                    report.checked += 1;
                    report.opportunities.push(*opportunity);
                }
                PathScan::BelowThreshold { .. } => {
                    report.checked += 1;
                    report.below_threshold += 1;
                }
                PathScan::Failed { .. } => report.failed += 1,
                PathScan::Skipped { .. } => report.skipped += 1,
            }
        }
        report.opportunities.sort_by(|a, b| {
            b.profit_percent()
                .total_cmp(&a.profit_percent())
                .then_with(|| a.path().key().cmp(b.path().key()))
        });
        report.elapsed = started.elapsed();

        info!(
            checked = report.checked,
            opportunities = report.opportunities.len(),
            failed = report.failed,
            skipped = report.skipped,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Scan finished"
        );
        report
    }
}
