mod harness;

use std::sync::Arc;

use chrono::{Duration, Utc};
use cyclarb::application::risk::CircuitBreaker;
use cyclarb::domain::breaker::{BreakerStatus, BreakerThresholds};
use cyclarb::port::outbound::notifier::NotifierRegistry;
use cyclarb::port::outbound::store::CIRCUIT_BREAKER_KEY;
use cyclarb::testkit::store::MemoryStore;
use harness::recording_notifier::RecordingNotifier;

fn registry(recorder: &RecordingNotifier) -> Arc<NotifierRegistry> {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(recorder.clone()));
    Arc::new(registry)
}

async fn breaker(store: &Arc<MemoryStore>) -> CircuitBreaker {
    CircuitBreaker::load(
        true,
        BreakerThresholds::default(),
        store.clone(),
        Arc::new(NotifierRegistry::new()),
    )
    .await
}

#[tokio::test]
async fn test_halted_state_survives_restart() {
    let store = Arc::new(MemoryStore::new());
    let first = breaker(&store).await;
    for _ in 0..9 {
        first.update(false, -0.5).await;
    }
    assert!(!first.is_trading_allowed());
    assert!(store.get(CIRCUIT_BREAKER_KEY).is_some());
    drop(first);

    let reloaded = breaker(&store).await;
    let state = reloaded.snapshot();
    assert_eq!(state.status(), BreakerStatus::Triggered);
    assert_eq!(state.level(), 4);
    assert_eq!(state.consecutive_losses(), 9);
    assert!(!reloaded.is_trading_allowed());
}

#[tokio::test]
async fn test_expired_cooldown_recovers_on_load() {
    let store = Arc::new(MemoryStore::new());
    let first = breaker(&store).await;
    let two_hours_ago = Utc::now() - Duration::hours(2);
    for _ in 0..9 {
        first.update_at(false, -0.5, two_hours_ago).await;
    }
    drop(first);

    let reloaded = breaker(&store).await;
    let state = reloaded.snapshot();
    assert_eq!(state.status(), BreakerStatus::Recovery);
    assert_eq!(state.level(), 3);
    assert!((reloaded.position_size_multiplier() - 0.25).abs() < 1e-9);
    assert!(reloaded.is_trading_allowed());
}

#[tokio::test]
async fn test_recovery_walks_back_to_normal() {
    let recorder = RecordingNotifier::new();
    let breaker = CircuitBreaker::new(
        true,
        BreakerThresholds::default(),
        Arc::new(MemoryStore::new()),
        registry(&recorder),
    );
    let start = Utc::now();
    for _ in 0..9 {
        breaker.update_at(false, -1.0, start).await;
    }

    assert!(breaker
        .check_recovery_progress_at(start + Duration::minutes(30))
        .await
        .is_none());
    let transition = breaker
        .check_recovery_progress_at(start + Duration::minutes(61))
        .await
        .expect("cooldown elapsed");
    assert_eq!(transition.to.status, BreakerStatus::Recovery);

    // Each win adds a tenth to the multiplier until it is back at one.
    let mut wins = 0;
    while breaker.snapshot().status() != BreakerStatus::Normal {
        breaker.update(true, 1.0).await;
        wins += 1;
        assert!(wins <= 10, "recovery never completed");
    }
    assert!((breaker.position_size_multiplier() - 1.0).abs() < 1e-9);
    assert_eq!(breaker.snapshot().level(), 0);
    assert!(recorder.transitions() >= 5);
}

#[tokio::test]
async fn test_disabled_breaker_never_halts() {
    let store = Arc::new(MemoryStore::new());
    let breaker = CircuitBreaker::load(
        false,
        BreakerThresholds::default(),
        store.clone(),
        Arc::new(NotifierRegistry::new()),
    )
    .await;
    for _ in 0..20 {
        assert!(breaker.update(false, -2.0).await.is_none());
    }
    assert!(breaker.is_trading_allowed());
    assert_eq!(breaker.position_size_multiplier(), 1.0);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_fresh() {
    let store = Arc::new(MemoryStore::new().with_entry(CIRCUIT_BREAKER_KEY, "{not json"));
    let breaker = breaker(&store).await;
    assert_eq!(breaker.snapshot().status(), BreakerStatus::Normal);
    assert!(breaker.is_trading_allowed());
}

#[tokio::test]
async fn test_store_failure_keeps_memory_state() {
    let store = Arc::new(MemoryStore::new());
    let breaker = breaker(&store).await;
    store.set_failing(true);
    for _ in 0..3 {
        breaker.update(false, -1.0).await;
    }
    assert_eq!(breaker.snapshot().status(), BreakerStatus::Warning);
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn test_inconsistent_snapshot_starts_fresh() {
    let snapshot = r#"{
        "enabled": true,
        "status": "normal",
        "consecutive_losses": 0,
        "total_losses": 0,
        "level": 9,
        "position_size_multiplier": 3.5,
        "recovery_deadline": null,
        "last_transition": null,
        "history": []
    }"#;
    let store = Arc::new(MemoryStore::new().with_entry(CIRCUIT_BREAKER_KEY, snapshot));
    let breaker = breaker(&store).await;

    let state = breaker.snapshot();
    assert_eq!(state.status(), BreakerStatus::Normal);
    assert_eq!(state.level(), 0);
    assert_eq!(breaker.position_size_multiplier(), 1.0);
    assert!(breaker.is_trading_allowed());
}

#[tokio::test]
async fn test_halted_snapshot_without_deadline_starts_fresh() {
    let snapshot = r#"{
        "enabled": true,
        "status": "triggered",
        "consecutive_losses": 9,
        "total_losses": 9,
        "level": 4,
        "position_size_multiplier": 0.0,
        "recovery_deadline": null,
        "last_transition": null,
        "history": []
    }"#;
    let store = Arc::new(MemoryStore::new().with_entry(CIRCUIT_BREAKER_KEY, snapshot));
    let breaker = breaker(&store).await;
    assert!(breaker.is_trading_allowed());
    assert_eq!(breaker.snapshot().level(), 0);
}
