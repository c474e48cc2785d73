//! Rolling per-path performance statistics.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PathKey;

/// Maximum number of recent outcomes kept per path.
pub const RECENT_OUTCOMES_CAP: usize = 100;

/// One recorded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathOutcome {
    pub at: DateTime<Utc>,
    pub success: bool,
    pub profit_percent: f64,
}

/// Aggregated history for a single path.
///
/// `attempts == successes + failures` holds after every
/// [`record`](Self::record). The average profit is taken over successful
/// attempts only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathHistoryRecord {
    key: PathKey,
    attempts: u64,
    successes: u64,
    failures: u64,
    cumulative_profit_percent: f64,
    average_profit_percent: f64,
    last_success: Option<DateTime<Utc>>,
    last_failure: Option<DateTime<Utc>>,
    recent: VecDeque<PathOutcome>,
}

impl PathHistoryRecord {
    /// Empty record for a path.
    #[must_use]
    pub fn new(key: PathKey) -> Self {
        Self {
            key,
            attempts: 0,
            successes: 0,
            failures: 0,
            cumulative_profit_percent: 0.0,
            average_profit_percent: 0.0,
            last_success: None,
            last_failure: None,
            recent: VecDeque::with_capacity(RECENT_OUTCOMES_CAP),
        }
    }

    /// Apply one attempt. Non-finite profits are recorded as zero.
    pub fn record(&mut self, success: bool, profit_percent: f64, at: DateTime<Utc>) {
        let profit_percent = if profit_percent.is_finite() {
            profit_percent
        } else {
            0.0
        };

        self.attempts += 1;
        if success {
            self.successes += 1;
            self.cumulative_profit_percent += profit_percent;
            self.average_profit_percent = self.cumulative_profit_percent / self.successes as f64;
            self.last_success = Some(at);
        } else {
            self.failures += 1;
            self.last_failure = Some(at);
        }

        if self.recent.len() == RECENT_OUTCOMES_CAP {
            self.recent.pop_front();
        }
        self.recent.push_back(PathOutcome {
            at,
            success,
            profit_percent,
        });
    }

    /// Whether the counters agree with each other and the averages are
    /// finite. Checked on records read back from a snapshot.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.successes.checked_add(self.failures) != Some(self.attempts) {
            return false;
        }
        if !self.cumulative_profit_percent.is_finite() || !self.average_profit_percent.is_finite() {
            return false;
        }
        if self.recent.len() > RECENT_OUTCOMES_CAP || self.recent.len() as u64 > self.attempts {
            return false;
        }
        if self.successes == 0 {
            return self.cumulative_profit_percent == 0.0 && self.average_profit_percent == 0.0;
        }
        let expected = self.cumulative_profit_percent / self.successes as f64;
        (self.average_profit_percent - expected).abs() <= 1e-9 * expected.abs().max(1.0)
    }

    #[must_use]
    pub const fn key(&self) -> &PathKey {
        &self.key
    }

    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.attempts
    }

    #[must_use]
    pub const fn successes(&self) -> u64 {
        self.successes
    }

    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    #[must_use]
    pub const fn cumulative_profit_percent(&self) -> f64 {
        self.cumulative_profit_percent
    }

    #[must_use]
    pub const fn average_profit_percent(&self) -> f64 {
        self.average_profit_percent
    }

    #[must_use]
    pub const fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    #[must_use]
    pub const fn last_failure(&self) -> Option<DateTime<Utc>> {
        self.last_failure
    }

    /// Recent outcomes, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &PathOutcome> {
        self.recent.iter()
    }

    /// Lifetime success rate in `[0, 1]`; zero without attempts.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64
    }

    /// Success rate over the last `n` recorded outcomes.
    #[must_use]
    pub fn recent_success_rate(&self, n: usize) -> f64 {
        let window: Vec<_> = self.recent.iter().rev().take(n).collect();
        if window.is_empty() {
            return 0.0;
        }
        window.iter().filter(|o| o.success).count() as f64 / window.len() as f64
    }

    /// Mean and population standard deviation of recent successful profits.
    #[must_use]
    pub fn recent_profit_stats(&self) -> Option<(f64, f64)> {
        let profits: Vec<f64> = self
            .recent
            .iter()
            .filter(|o| o.success)
            .map(|o| o.profit_percent)
            .collect();
        if profits.is_empty() {
            return None;
        }
        let n = profits.len() as f64;
        let mean = profits.iter().sum::<f64>() / n;
        let variance = profits.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        Some((mean, variance.sqrt()))
    }

    /// Standard deviation of recent successful profits; zero without any.
    #[must_use]
    pub fn profit_std_dev(&self) -> f64 {
        self.recent_profit_stats().map_or(0.0, |(_, std)| std)
    }

    /// Mean magnitude of recent losing outcomes (negative profits).
    #[must_use]
    pub fn recent_average_loss_percent(&self) -> Option<f64> {
        let losses: Vec<f64> = self
            .recent
            .iter()
            .filter(|o| !o.success && o.profit_percent < 0.0)
            .map(|o| -o.profit_percent)
            .collect();
        if losses.is_empty() {
            return None;
        }
        Some(losses.iter().sum::<f64>() / losses.len() as f64)
    }
}
