//! Handler for the `status` command.
//!
//! Reads persisted state only; no venue calls are made. A recovery deadline
//! that has passed is applied while loading the breaker, as a running engine
//! would on its next cycle.

use std::sync::Arc;

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::StatusArgs;
use crate::adapter::inbound::cli::output;
use crate::application::history::PathHistoryStore;
use crate::application::risk::CircuitBreaker;
use crate::domain::breaker::{BreakerState, BreakerStatus, BreakerThresholds};
use crate::domain::history::PathHistoryRecord;
use crate::error::Result;
use crate::infrastructure::bootstrap::snapshot_store;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::notifier::NotifierRegistry;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Attempts")]
    attempts: u64,
    #[tabled(rename = "Success")]
    success_rate: String,
    #[tabled(rename = "Avg profit")]
    average_profit: String,
    #[tabled(rename = "Last success")]
    last_success: String,
}

#[derive(Tabled)]
struct WalletRow {
    #[tabled(rename = "Wallet")]
    id: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Ready")]
    ready: &'static str,
}

/// Execute the status command.
pub async fn execute(args: &StatusArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let store = snapshot_store(&config);

    let history = PathHistoryStore::load(store.clone()).await;
    let breaker = CircuitBreaker::load(
        config.circuit_breaker.enabled,
        BreakerThresholds::from(&config.circuit_breaker),
        store,
        Arc::new(NotifierRegistry::new()),
    )
    .await;
    let state = breaker.snapshot();

    let mut records = history.all();
    records.sort_by(|a, b| {
        b.attempts()
            .cmp(&a.attempts())
            .then_with(|| a.key().cmp(b.key()))
    });
    records.truncate(args.limit);

    if output::is_json() {
        output::json_output(&json!({
            "command": "status",
            "dry_run": config.dry_run,
            "state_dir": config.storage.dir.display().to_string(),
            "circuit_breaker": state,
            "trading_allowed": state.is_trading_allowed(),
            "wallets": config.wallet_entries(),
            "history_paths": history.len(),
            "history": records,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Mode", if config.dry_run { "dry-run" } else { "live" });
    output::field("State dir", config.storage.dir.display());

    print_breaker(&state);
    print_wallets(&config);
    print_history(&records, history.len());
    Ok(())
}

fn print_breaker(state: &BreakerState) {
    output::section("Circuit breaker");
    let status = match state.status() {
        BreakerStatus::Normal => output::positive(state.status()),
        BreakerStatus::Recovery => output::muted(state.status()),
        _ => output::negative(state.status()),
    };
    output::field("Status", status);
    output::field("Level", state.level());
    output::field("Size multiplier", format!("{:.2}", state.position_size_multiplier()));
    output::field("Consecutive losses", state.consecutive_losses());
    output::field("Total losses", state.total_losses());
    if let Some(deadline) = state.recovery_deadline() {
        output::field("Recovery at", deadline.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !state.enabled() {
        output::warning("Circuit breaker disabled");
    }
}

fn print_wallets(config: &Config) {
    output::section("Wallets");
    let entries = config.wallet_entries();
    if entries.is_empty() {
        output::note("No wallets configured");
        return;
    }
    let rows: Vec<WalletRow> = entries
        .iter()
        .map(|w| WalletRow {
            id: w.id().to_string(),
            address: w.address().to_string(),
            ready: if w.is_ready() { "yes" } else { "no key" },
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
}

fn print_history(records: &[PathHistoryRecord], total: usize) {
    output::section("Path history");
    if records.is_empty() {
        output::note("No attempts recorded yet");
        return;
    }
    let rows: Vec<HistoryRow> = records
        .iter()
        .map(|r| HistoryRow {
            path: r.key().to_string(),
            attempts: r.attempts(),
            success_rate: format!("{:.0}%", r.success_rate() * 100.0),
            average_profit: output::percent(r.average_profit_percent()),
            last_success: r
                .last_success()
                .map_or_else(|| "never".to_string(), |t| t.format("%m-%d %H:%M").to_string()),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    if total > records.len() {
        output::note(&format!("{} of {total} paths shown", records.len()));
    }
}
