//! History-based path ranking.
//!
//! A path's score blends its observed success rate, average profit and the
//! recency of its last success, weighted by how much evidence there is.
//! Paths with no history get the exploration score.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{history::PathHistoryRecord, id::Mint, id::PathKey, path::Path};

/// Scoring weights and scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub success_rate: f64,
    pub profit: f64,
    pub recency: f64,
    /// Average profit (percent) that earns the full profit component.
    pub profit_scale_percent: f64,
    /// Age at which the recency component halves.
    pub recency_half_life: Duration,
    /// Attempts at which evidence and exploration are weighted equally.
    pub confidence_prior: f64,
    /// Score assigned to paths without history.
    pub exploration_score: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            success_rate: 0.5,
            profit: 0.3,
            recency: 0.2,
            profit_scale_percent: 1.0,
            recency_half_life: Duration::hours(24),
            confidence_prior: 10.0,
            exploration_score: 0.5,
        }
    }
}

/// A path with its ranking score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPath {
    pub path: Path,
    pub score: f64,
    pub attempts: u64,
    pub success_rate: f64,
}

/// Exponential decay in `[0, 1]` for an event `age` ago.
#[must_use]
pub fn recency_decay(age: Duration, half_life: Duration) -> f64 {
    let half_life_secs = half_life.num_seconds();
    if half_life_secs <= 0 {
        return 0.0;
    }
    let age_secs = age.num_seconds().max(0) as f64;
    0.5f64.powf(age_secs / half_life_secs as f64)
}

/// Score in `[0, 1]` for a path with the given history.
#[must_use]
pub fn score(record: Option<&PathHistoryRecord>, weights: &RankingWeights, now: DateTime<Utc>) -> f64 {
    let exploration = weights.exploration_score.clamp(0.0, 1.0);
    let Some(record) = record.filter(|r| r.attempts() > 0) else {
        return exploration;
    };

    let n = record.attempts() as f64;
    let prior = weights.confidence_prior.max(0.0);
    let confidence = n / (n + prior);

    let profit = if weights.profit_scale_percent > 0.0 {
        (record.average_profit_percent() / weights.profit_scale_percent).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let recency = record
        .last_success()
        .map_or(0.0, |at| recency_decay(now - at, weights.recency_half_life));

    let total = weights.success_rate.max(0.0) + weights.profit.max(0.0) + weights.recency.max(0.0);
    let evidence = if total > 0.0 {
        (weights.success_rate.max(0.0) * record.success_rate()
            + weights.profit.max(0.0) * profit
            + weights.recency.max(0.0) * recency)
            / total
    } else {
        0.0
    };

    let blended = confidence * evidence + (1.0 - confidence) * exploration;
    if blended.is_finite() {
        blended.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Score and sort paths, best first. Ties break on ascending path key.
pub fn rank<F>(
    paths: impl IntoIterator<Item = Path>,
    lookup: F,
    weights: &RankingWeights,
    now: DateTime<Utc>,
) -> Vec<RankedPath>
where
    F: Fn(&PathKey) -> Option<PathHistoryRecord>,
{
    let mut ranked: Vec<RankedPath> = paths
        .into_iter()
        .map(|path| {
            let record = lookup(path.key());
            RankedPath {
                score: score(record.as_ref(), weights, now),
                attempts: record.as_ref().map_or(0, PathHistoryRecord::attempts),
                success_rate: record.as_ref().map_or(0.0, PathHistoryRecord::success_rate),
                path,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.path.key().cmp(b.path.key()))
    });
    ranked
}

/// Keep the first `k` entries of each (base token, hop count) group.
///
/// Input order is preserved, so a ranked list stays ranked.
#[must_use]
pub fn top_k_per_group(ranked: Vec<RankedPath>, k: usize) -> Vec<RankedPath> {
    let mut taken: HashMap<(Mint, usize), usize> = HashMap::new();
    ranked
        .into_iter()
        .filter(|r| {
            let group = (r.path.base().mint().clone(), r.path.hop_count());
            let count = taken.entry(group).or_insert(0);
            *count += 1;
            *count <= k
        })
        .collect()
}
