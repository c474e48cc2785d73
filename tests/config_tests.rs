mod harness;

use std::sync::Arc;

use cyclarb::adapter::outbound::file_store::FileSnapshotStore;
use cyclarb::application::history::PathHistoryStore;
use cyclarb::application::orchestration::CycleOutcome;
use cyclarb::domain::id::PathKey;
use cyclarb::error::{ConfigError, Error};
use cyclarb::infrastructure::bootstrap::{build_catalog, build_context_with, Collaborators};
use cyclarb::infrastructure::config::Config;
use cyclarb::infrastructure::runtime::run_once;
use cyclarb::port::outbound::notifier::NotifierRegistry;
use cyclarb::port::outbound::store::PATH_HISTORY_KEY;
use cyclarb::testkit::balance::StaticBalanceOracle;
use cyclarb::testkit::venue::ScriptedVenue;
use harness::config::{engine_toml, write_config};
use tempfile::TempDir;

fn load(dir: &TempDir, contents: &str) -> Config {
    let path = write_config(dir.path(), contents);
    Config::load(path).expect("config loads")
}

fn collaborators(config: &Config) -> Collaborators {
    Collaborators {
        venue: Arc::new(
            ScriptedVenue::new()
                .with_rate("usdc", "sol", 0.01)
                .with_rate("sol", "usdc", 102.0),
        ),
        oracle: Arc::new(StaticBalanceOracle::new(u64::MAX)),
        store: Arc::new(FileSnapshotStore::new(config.storage.dir.clone())),
    }
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn test_unknown_path_token_is_rejected() {
    let dir = TempDir::new().unwrap();
    let toml = engine_toml(&dir.path().join("state"))
        .replace(r#"tokens = ["USDC", "SOL"]"#, r#"tokens = ["USDC", "WIF"]"#);
    let path = write_config(dir.path(), &toml);
    let err = Config::load(path).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::UnknownToken { ref symbol, .. }) if symbol == "WIF"
    ));
}

#[test]
fn test_catalog_from_config() {
    let dir = TempDir::new().unwrap();
    let config = load(&dir, &engine_toml(&dir.path().join("state")));
    let catalog = build_catalog(&config).unwrap();
    let keys: Vec<_> = catalog
        .static_paths()
        .iter()
        .map(|p| p.key().to_string())
        .collect();
    assert_eq!(keys, vec!["USDC->SOL->USDC"]);
    assert!(catalog.dynamic_paths().is_empty());
}

#[test]
fn test_dynamic_catalog_from_config() {
    let dir = TempDir::new().unwrap();
    let toml = engine_toml(&dir.path().join("state"))
        .replace("[catalog]\n", "[catalog]\nmode = \"dynamic\"\n");
    let config = load(&dir, &toml);
    let catalog = build_catalog(&config).unwrap();
    // Two 2-hop and two 3-hop cycles through USDC.
    assert_eq!(catalog.dynamic_paths().len(), 4);
}

#[tokio::test]
async fn test_history_survives_restart_on_disk() {
    let dir = TempDir::new().unwrap();
    let config = load(&dir, &engine_toml(&dir.path().join("state")));

    let ctx = build_context_with(&config, collaborators(&config), NotifierRegistry::new())
        .await
        .unwrap();
    let CycleOutcome::Completed(report) = run_once(ctx).await else {
        panic!("cycle skipped");
    };
    assert_eq!(report.trades.len(), 1);
    assert!(report.trades[0].simulated);

    let snapshot = dir.path().join("state").join(format!("{PATH_HISTORY_KEY}.json"));
    assert!(snapshot.exists());

    // A fresh process sees the recorded trade.
    let store = Arc::new(FileSnapshotStore::new(config.storage.dir.clone()));
    let history = PathHistoryStore::load(store).await;
    let record = history
        .get(&PathKey::from("USDC->SOL->USDC"))
        .expect("history persisted");
    assert!(record.attempts() >= 1);
    assert!(record.successes() >= 1);

    let ctx = build_context_with(&config, collaborators(&config), NotifierRegistry::new())
        .await
        .unwrap();
    assert_eq!(ctx.history.len(), 1);
}

#[tokio::test]
async fn test_live_mode_without_keys_has_no_ready_wallet() {
    let dir = TempDir::new().unwrap();
    let toml = engine_toml(&dir.path().join("state")).replace("dry_run = true", "dry_run = false");
    let path = write_config(dir.path(), &toml);
    let mut config = Config::load(path).unwrap();
    config.wallet_keys.clear();

    let ctx = build_context_with(&config, collaborators(&config), NotifierRegistry::new())
        .await
        .unwrap();
    assert!(!ctx.settings.dry_run);
    let CycleOutcome::Completed(report) = run_once(ctx).await else {
        panic!("cycle skipped");
    };
    assert!(report.trades.is_empty());
    assert_eq!(report.skipped.len(), 1);
}
