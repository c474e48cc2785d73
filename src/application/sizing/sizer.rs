//! Kelly-based position sizer.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::allocation::AllocationBounds;
use super::kelly::scaled_kelly;
use crate::application::catalog::ranking::recency_decay;
use crate::domain::history::PathHistoryRecord;

/// Sizing tunables. Amounts are in base-token UI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingSettings {
    pub min_position_size: Decimal,
    pub max_position_size: Decimal,
    /// Attempts required before Kelly sizing applies.
    pub min_attempts: u64,
    /// Fraction of full Kelly to bet.
    pub kelly_multiplier: f64,
    /// Divisor applied to the Kelly fraction, at least one.
    pub volatility_factor: f64,
    /// Loss magnitude (percent) assumed when no losses are on record.
    pub default_loss_percent: f64,
    pub recency_half_life: Duration,
}

impl Default for SizingSettings {
    fn default() -> Self {
        Self {
            min_position_size: Decimal::TEN,
            max_position_size: Decimal::ONE_THOUSAND,
            min_attempts: 5,
            kelly_multiplier: 0.5,
            volatility_factor: 1.0,
            default_loss_percent: 1.0,
            recency_half_life: Duration::hours(24),
        }
    }
}

impl SizingSettings {
    #[must_use]
    pub const fn allocation_bounds(&self) -> AllocationBounds {
        AllocationBounds {
            min: self.min_position_size,
            max: self.max_position_size,
        }
    }
}

/// How a size was derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum SizingBasis {
    /// Not enough history; floor size.
    Floor,
    /// Kelly estimate with the fraction actually applied.
    Kelly { fraction: f64 },
}

/// A sized position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSize {
    /// Capital to commit, base-token UI units.
    pub amount: Decimal,
    pub basis: SizingBasis,
    /// Reliability in `[0, 1]` applied to the Kelly size.
    pub reliability: f64,
}

/// Kelly-based position sizer.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    settings: SizingSettings,
}

impl PositionSizer {
    #[must_use]
    pub const fn new(settings: SizingSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &SizingSettings {
        &self.settings
    }

    /// Size a trade on a path with the given history.
    #[must_use]
    pub fn size(&self, record: Option<&PathHistoryRecord>, now: DateTime<Utc>) -> PositionSize {
        let floor = self.settings.min_position_size.max(Decimal::ZERO);
        let max = self.settings.max_position_size.max(floor);

        let Some(record) = record.filter(|r| r.attempts() >= self.settings.min_attempts) else {
            return PositionSize {
                amount: floor,
                basis: SizingBasis::Floor,
                reliability: 1.0,
            };
        };

        let fraction = scaled_kelly(
            record.success_rate(),
            self.payoff_ratio(record),
            self.settings.kelly_multiplier,
            self.settings.volatility_factor,
        );
        let reliability = self.reliability(record, now);
        let kelly = max * ratio(fraction);
        let amount = (floor.max(kelly) * ratio(reliability)).min(max);

        PositionSize {
            amount: amount.max(Decimal::ZERO),
            basis: SizingBasis::Kelly { fraction },
            reliability,
        }
    }

    /// Average win over average loss.
    #[must_use]
    pub fn payoff_ratio(&self, record: &PathHistoryRecord) -> f64 {
        let win = record.average_profit_percent();
        let loss = record
            .recent_average_loss_percent()
            .filter(|l| *l > 0.0)
            .unwrap_or(self.settings.default_loss_percent);
        if win <= 0.0 || loss <= 0.0 {
            return 0.0;
        }
        win / loss
    }

    /// Blend of success rate, profit consistency and recency of success.
    #[must_use]
    pub fn reliability(&self, record: &PathHistoryRecord, now: DateTime<Utc>) -> f64 {
        let consistency = match record.recent_profit_stats() {
            Some((mean, std)) if mean.abs() > f64::EPSILON => 1.0 / (1.0 + std / mean.abs()),
            _ => 0.0,
        };
        let recency = record.last_success().map_or(0.0, |at| {
            recency_decay(now - at, self.settings.recency_half_life)
        });
        let blended = 0.4 * record.success_rate() + 0.3 * consistency + 0.3 * recency;
        if blended.is_finite() {
            blended.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Allocation score for a path expected to return `expected_profit_percent`.
    ///
    /// Paths without enough history are scored at half reliability so they
    /// still receive capital.
    #[must_use]
    pub fn allocation_score(
        &self,
        record: Option<&PathHistoryRecord>,
        expected_profit_percent: f64,
        now: DateTime<Utc>,
    ) -> f64 {
        let edge = if expected_profit_percent.is_finite() {
            expected_profit_percent.max(0.0)
        } else {
            0.0
        };
        let reliability = match record.filter(|r| r.attempts() >= self.settings.min_attempts) {
            Some(r) => self.reliability(r, now),
            None => 0.5,
        };
        edge * reliability
    }
}

/// A finite fraction as a `Decimal`; anything else counts as zero.
fn ratio(value: f64) -> Decimal {
    if value.is_finite() {
        Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}
