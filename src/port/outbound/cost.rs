//! External cost signal port.
//!
//! Network fees and priority tips are priced elsewhere; the scanner only
//! consumes the extra profit they require.

use crate::domain::path::Path;

/// Extra profit, in percent, a path must clear on top of its threshold.
pub trait CostSignal: Send + Sync {
    fn extra_profit_percent(&self, path: &Path) -> f64;
}

/// Constant surcharge per hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCostSignal {
    per_hop_percent: f64,
}

impl FixedCostSignal {
    #[must_use]
    pub const fn new(per_hop_percent: f64) -> Self {
        Self { per_hop_percent }
    }
}

impl CostSignal for FixedCostSignal {
    fn extra_profit_percent(&self, path: &Path) -> f64 {
        if !self.per_hop_percent.is_finite() || self.per_hop_percent <= 0.0 {
            return 0.0;
        }
        self.per_hop_percent * path.hop_count() as f64
    }
}
