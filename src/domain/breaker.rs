//! Circuit breaker state machine.
//!
//! Pure state and transition rules; persistence and event fan-out live in
//! the application layer's `CircuitBreaker`.
//!
//! ```text
//! normal -> warning (L1) -> triggered (L2..L4) -> recovery -> normal
//! ```
//!
//! Levels only rise on a threshold breach and only fall through
//! [`BreakerState::reset`] or graduated recovery.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Highest level; trading is halted here until the recovery deadline.
pub const MAX_LEVEL: u8 = 4;

/// Maximum number of outcomes kept in the breaker history.
pub const BREAKER_HISTORY_CAP: usize = 100;

/// Multiplier increment applied per success while recovering.
const RECOVERY_STEP: f64 = 0.1;

/// Circuit breaker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakerStatus {
    Normal,
    Warning,
    Triggered,
    Recovery,
}

impl BreakerStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Triggered => "triggered",
            Self::Recovery => "recovery",
        }
    }
}

impl fmt::Display for BreakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consecutive-loss thresholds and the level-4 cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerThresholds {
    /// Losses before warning (level 1).
    pub warning: u32,
    /// Losses before triggering at level 2.
    pub triggered: u32,
    /// Losses before level 3. Level 4 follows at `severe + 2`.
    pub severe: u32,
    /// Time spent halted at level 4 before recovery begins.
    pub cooldown: Duration,
}

impl Default for BreakerThresholds {
    fn default() -> Self {
        Self {
            warning: 3,
            triggered: 5,
            severe: 7,
            cooldown: Duration::hours(1),
        }
    }
}

impl BreakerThresholds {
    /// Consecutive losses that halt trading.
    #[must_use]
    pub const fn halt(&self) -> u32 {
        self.severe.saturating_add(2)
    }

    /// Level implied by a consecutive loss count.
    #[must_use]
    pub const fn level_for(&self, consecutive_losses: u32) -> u8 {
        if consecutive_losses >= self.halt() {
            4
        } else if consecutive_losses >= self.severe {
            3
        } else if consecutive_losses >= self.triggered {
            2
        } else if consecutive_losses >= self.warning {
            1
        } else {
            0
        }
    }
}

/// Position-size multiplier for a level.
#[must_use]
pub const fn multiplier_for(level: u8) -> f64 {
    match level {
        0 => 1.0,
        1 => 0.75,
        2 => 0.5,
        3 => 0.25,
        _ => 0.0,
    }
}

/// Level reached while recovering at a given multiplier.
fn recovery_level_for(multiplier: f64) -> u8 {
    if multiplier >= 1.0 {
        0
    } else if multiplier >= 0.75 {
        1
    } else if multiplier >= 0.5 {
        2
    } else {
        3
    }
}

/// Externally visible summary of the breaker, used in transition events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakerPhase {
    pub status: BreakerStatus,
    pub level: u8,
    pub multiplier: f64,
}

impl fmt::Display for BreakerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} L{} x{:.2}", self.status, self.level, self.multiplier)
    }
}

/// A transition from one phase to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakerTransition {
    pub from: BreakerPhase,
    pub to: BreakerPhase,
}

/// One trade outcome as seen by the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakerOutcome {
    pub at: DateTime<Utc>,
    pub success: bool,
    pub profit_percent: f64,
}

/// Full breaker state, serialized as the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerState {
    enabled: bool,
    status: BreakerStatus,
    consecutive_losses: u32,
    total_losses: u64,
    level: u8,
    position_size_multiplier: f64,
    recovery_deadline: Option<DateTime<Utc>>,
    last_transition: Option<DateTime<Utc>>,
    history: VecDeque<BreakerOutcome>,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl BreakerState {
    /// Fresh state in `normal`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            status: BreakerStatus::Normal,
            consecutive_losses: 0,
            total_losses: 0,
            level: 0,
            position_size_multiplier: 1.0,
            recovery_deadline: None,
            last_transition: None,
            history: VecDeque::with_capacity(BREAKER_HISTORY_CAP),
        }
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Apply the configured enabled flag, e.g. after loading a snapshot.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub const fn status(&self) -> BreakerStatus {
        self.status
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub const fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    #[must_use]
    pub const fn total_losses(&self) -> u64 {
        self.total_losses
    }

    /// Multiplier in `[0, 1]` the caller applies to capital.
    #[must_use]
    pub fn position_size_multiplier(&self) -> f64 {
        if self.enabled {
            self.position_size_multiplier
        } else {
            1.0
        }
    }

    #[must_use]
    pub const fn recovery_deadline(&self) -> Option<DateTime<Utc>> {
        self.recovery_deadline
    }

    #[must_use]
    pub const fn last_transition(&self) -> Option<DateTime<Utc>> {
        self.last_transition
    }

    /// Outcomes seen by the breaker, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &BreakerOutcome> {
        self.history.iter()
    }

    #[must_use]
    pub fn phase(&self) -> BreakerPhase {
        BreakerPhase {
            status: self.status,
            level: self.level,
            multiplier: self.position_size_multiplier,
        }
    }

    /// Whether the fields describe a state the transition rules can reach.
    ///
    /// A halted breaker must carry a recovery deadline, and the multiplier
    /// must match the level outside recovery.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let multiplier = self.position_size_multiplier;
        if self.level > MAX_LEVEL || !multiplier.is_finite() || !(0.0..=1.0).contains(&multiplier) {
            return false;
        }
        let at_level = (multiplier - multiplier_for(self.level)).abs() < 1e-9;
        match self.status {
            BreakerStatus::Normal => self.level == 0 && at_level,
            BreakerStatus::Warning => self.level == 1 && at_level,
            BreakerStatus::Triggered => {
                (2..=MAX_LEVEL).contains(&self.level)
                    && at_level
                    && (self.level < MAX_LEVEL || self.recovery_deadline.is_some())
            }
            BreakerStatus::Recovery => {
                (1..MAX_LEVEL).contains(&self.level)
                    && multiplier + 1e-9 >= multiplier_for(self.level)
                    && multiplier < 1.0
            }
        }
    }

    /// False only while halted at level 4 and not yet recovering.
    #[must_use]
    pub const fn is_trading_allowed(&self) -> bool {
        !self.enabled || self.level < MAX_LEVEL
    }

    /// Apply a trade outcome. Returns the transition if the phase changed.
    pub fn update(
        &mut self,
        success: bool,
        profit_percent: f64,
        now: DateTime<Utc>,
        thresholds: &BreakerThresholds,
    ) -> Option<BreakerTransition> {
        if self.history.len() == BREAKER_HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(BreakerOutcome {
            at: now,
            success,
            profit_percent: if profit_percent.is_finite() {
                profit_percent
            } else {
                0.0
            },
        });

        if !self.enabled {
            return None;
        }

        let before = self.phase();
        if success {
            self.on_success();
        } else {
            self.on_failure(now, thresholds);
        }
        self.commit(before, now)
    }

    /// Move a halted breaker into recovery once its deadline has passed.
    pub fn check_recovery(&mut self, now: DateTime<Utc>) -> Option<BreakerTransition> {
        if !self.enabled || self.status != BreakerStatus::Triggered || self.level < MAX_LEVEL {
            return None;
        }
        let deadline = self.recovery_deadline?;
        if now < deadline {
            return None;
        }

        let before = self.phase();
        self.status = BreakerStatus::Recovery;
        self.level = 3;
        self.position_size_multiplier = multiplier_for(3);
        self.recovery_deadline = None;
        self.commit(before, now)
    }

    /// Operator reset to `normal`.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<BreakerTransition> {
        let before = self.phase();
        self.status = BreakerStatus::Normal;
        self.level = 0;
        self.position_size_multiplier = 1.0;
        self.consecutive_losses = 0;
        self.recovery_deadline = None;
        self.commit(before, now)
    }

    fn on_success(&mut self) {
        self.consecutive_losses = 0;
        match self.status {
            BreakerStatus::Normal => {}
            BreakerStatus::Warning => self.restore_normal(),
            BreakerStatus::Triggered => {
                // Halted breakers wait for their deadline.
                if self.level < MAX_LEVEL {
                    self.status = BreakerStatus::Recovery;
                }
            }
            BreakerStatus::Recovery => {
                let stepped = self.position_size_multiplier + RECOVERY_STEP;
                let stepped = ((stepped * 100.0).round() / 100.0).min(1.0);
                if stepped >= 1.0 {
                    self.restore_normal();
                } else {
                    self.position_size_multiplier = stepped;
                    self.level = self.level.min(recovery_level_for(stepped));
                }
            }
        }
    }

    fn on_failure(&mut self, now: DateTime<Utc>, thresholds: &BreakerThresholds) {
        self.consecutive_losses = self.consecutive_losses.saturating_add(1);
        self.total_losses = self.total_losses.saturating_add(1);

        let target = thresholds.level_for(self.consecutive_losses);
        if target > self.level {
            self.level = target;
            self.position_size_multiplier = multiplier_for(target);
            self.status = if target == 1 {
                BreakerStatus::Warning
            } else {
                BreakerStatus::Triggered
            };
            if target >= MAX_LEVEL {
                self.recovery_deadline = Some(now + thresholds.cooldown);
            }
        } else if self.status == BreakerStatus::Recovery {
            // A loss while recovering forfeits the progress made at this level.
            self.position_size_multiplier = multiplier_for(self.level);
        }
    }

    fn restore_normal(&mut self) {
        self.status = BreakerStatus::Normal;
        self.level = 0;
        self.position_size_multiplier = 1.0;
        self.recovery_deadline = None;
    }

    fn commit(&mut self, before: BreakerPhase, now: DateTime<Utc>) -> Option<BreakerTransition> {
        let after = self.phase();
        if after == before {
            return None;
        }
        self.last_transition = Some(now);
        Some(BreakerTransition {
            from: before,
            to: after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(state: &mut BreakerState, n: u32, now: DateTime<Utc>) {
        let th = BreakerThresholds::default();
        for _ in 0..n {
            state.update(false, -1.0, now, &th);
        }
    }

    #[test]
    fn test_three_failures_warn() {
        let mut state = BreakerState::default();
        fail(&mut state, 3, Utc::now());
        assert_eq!(state.status(), BreakerStatus::Warning);
        assert_eq!(state.level(), 1);
        assert!((state.position_size_multiplier() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_five_failures_trigger_level_two() {
        let mut state = BreakerState::default();
        fail(&mut state, 5, Utc::now());
        assert_eq!(state.status(), BreakerStatus::Triggered);
        assert_eq!(state.level(), 2);
        assert!((state.position_size_multiplier() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_seven_failures_level_three() {
        let mut state = BreakerState::default();
        fail(&mut state, 7, Utc::now());
        assert_eq!(state.level(), 3);
        assert!((state.position_size_multiplier() - 0.25).abs() < 1e-9);
        assert!(state.is_trading_allowed());
    }

    #[test]
    fn test_nine_failures_halt_with_deadline() {
        let now = Utc::now();
        let mut state = BreakerState::default();
        fail(&mut state, 9, now);
        assert_eq!(state.level(), 4);
        assert_eq!(state.position_size_multiplier(), 0.0);
        assert!(!state.is_trading_allowed());
        assert_eq!(state.recovery_deadline(), Some(now + Duration::hours(1)));
    }

    #[test]
    fn test_recovery_only_after_deadline() {
        let now = Utc::now();
        let mut state = BreakerState::default();
        fail(&mut state, 9, now);

        assert!(state.check_recovery(now + Duration::minutes(59)).is_none());
        assert!(!state.is_trading_allowed());

        let transition = state.check_recovery(now + Duration::hours(1)).unwrap();
        assert_eq!(transition.from.level, 4);
        assert_eq!(state.status(), BreakerStatus::Recovery);
        assert_eq!(state.level(), 3);
        assert!((state.position_size_multiplier() - 0.25).abs() < 1e-9);
        assert!(state.is_trading_allowed());
    }

    #[test]
    fn test_recovery_steps_back_to_normal() {
        let now = Utc::now();
        let th = BreakerThresholds::default();
        let mut state = BreakerState::default();
        fail(&mut state, 9, now);
        state.check_recovery(now + Duration::hours(2));

        let mut successes = 0;
        while state.status() == BreakerStatus::Recovery {
            let before = state.level();
            state.update(true, 1.0, now, &th);
            assert!(state.level() <= before);
            successes += 1;
            assert!(successes <= 10, "recovery never completed");
        }

        assert_eq!(successes, 8);
        assert_eq!(state.status(), BreakerStatus::Normal);
        assert_eq!(state.level(), 0);
        assert_eq!(state.position_size_multiplier(), 1.0);
    }

    #[test]
    fn test_success_in_warning_restores_normal() {
        let now = Utc::now();
        let mut state = BreakerState::default();
        fail(&mut state, 4, now);
        state.update(true, 0.5, now, &BreakerThresholds::default());
        assert_eq!(state.status(), BreakerStatus::Normal);
        assert_eq!(state.consecutive_losses(), 0);
        assert_eq!(state.total_losses(), 4);
    }

    #[test]
    fn test_success_while_triggered_enters_recovery() {
        let now = Utc::now();
        let mut state = BreakerState::default();
        fail(&mut state, 5, now);
        let t = state.update(true, 0.5, now, &BreakerThresholds::default()).unwrap();
        assert_eq!(t.to.status, BreakerStatus::Recovery);
        assert_eq!(state.level(), 2);
        assert!((state.position_size_multiplier() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_success_while_halted_waits_for_deadline() {
        let now = Utc::now();
        let mut state = BreakerState::default();
        fail(&mut state, 9, now);
        state.update(true, 0.5, now, &BreakerThresholds::default());
        assert_eq!(state.level(), 4);
        assert!(!state.is_trading_allowed());
    }

    #[test]
    fn test_disabled_never_transitions() {
        let mut state = BreakerState::new(false);
        fail(&mut state, 20, Utc::now());
        assert_eq!(state.status(), BreakerStatus::Normal);
        assert!(state.is_trading_allowed());
        assert_eq!(state.position_size_multiplier(), 1.0);
    }

    #[test]
    fn test_reset_returns_to_normal() {
        let now = Utc::now();
        let mut state = BreakerState::default();
        fail(&mut state, 9, now);
        assert!(state.reset(now).is_some());
        assert_eq!(state.level(), 0);
        assert!(state.is_trading_allowed());
        assert!(state.recovery_deadline().is_none());
    }

    #[test]
    fn test_bounds_hold_for_mixed_sequences() {
        let th = BreakerThresholds::default();
        let mut now = Utc::now();
        let mut state = BreakerState::default();
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;

        for _ in 0..5_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let success = seed % 3 == 0;
            state.update(success, 0.5, now, &th);
            now += Duration::minutes((seed % 40) as i64);
            state.check_recovery(now);

            let m = state.position_size_multiplier();
            assert!((0.0..=1.0).contains(&m), "multiplier {m} out of range");
            assert!(state.level() <= MAX_LEVEL);
            assert!(state.history().count() <= BREAKER_HISTORY_CAP);
            assert!(state.is_consistent(), "unreachable state {state:?}");
        }
    }

    fn snapshot(status: &str, level: u8, multiplier: f64, deadline: bool) -> BreakerState {
        let deadline = if deadline {
            serde_json::json!(Utc::now())
        } else {
            serde_json::Value::Null
        };
        serde_json::from_value(serde_json::json!({
            "enabled": true,
            "status": status,
            "consecutive_losses": 0,
            "total_losses": 0,
            "level": level,
            "position_size_multiplier": multiplier,
            "recovery_deadline": deadline,
            "last_transition": null,
            "history": [],
        }))
        .unwrap()
    }

    #[test]
    fn test_unreachable_snapshots_are_inconsistent() {
        assert!(snapshot("normal", 0, 1.0, false).is_consistent());
        assert!(snapshot("triggered", 4, 0.0, true).is_consistent());
        assert!(snapshot("recovery", 2, 0.65, false).is_consistent());

        assert!(!snapshot("normal", 9, 3.5, false).is_consistent());
        assert!(!snapshot("normal", 0, 0.5, false).is_consistent());
        assert!(!snapshot("warning", 3, 0.25, false).is_consistent());
        assert!(!snapshot("triggered", 4, 0.0, false).is_consistent());
        assert!(!snapshot("triggered", 1, 0.75, false).is_consistent());
        assert!(!snapshot("recovery", 3, 0.1, false).is_consistent());
        assert!(!snapshot("recovery", 0, 1.0, false).is_consistent());
        assert!(!snapshot("normal", 0, -0.5, false).is_consistent());
    }
}
