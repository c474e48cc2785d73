//! Handler for the `paths` command: the ranked path catalog.

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::PathsArgs;
use crate::adapter::inbound::cli::output;
use crate::application::history::PathHistoryStore;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_catalog, snapshot_store};
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Hops")]
    hops: usize,
    #[tabled(rename = "Min profit")]
    min_profit: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Attempts")]
    attempts: u64,
    #[tabled(rename = "Success")]
    success_rate: String,
}

/// Execute the paths command.
pub async fn execute(args: &PathsArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    let catalog = build_catalog(&config)?;
    let history = PathHistoryStore::load(snapshot_store(&config)).await;
    let ranked = catalog.ranked(&history, Utc::now());

    if output::is_json() {
        output::json_output(&json!({
            "command": "paths",
            "mode": catalog.mode(),
            "static": catalog.static_paths().len(),
            "dynamic": catalog.dynamic_paths().len(),
            "paths": ranked,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Scan", format!("{:?}", catalog.mode()).to_lowercase());
    output::field("Static paths", catalog.static_paths().len());
    output::field("Generated paths", catalog.dynamic_paths().len());

    if ranked.is_empty() {
        output::warning("No paths survive the token policy");
        return Ok(());
    }
    let rows: Vec<PathRow> = ranked
        .iter()
        .map(|r| PathRow {
            path: r.path.key().to_string(),
            origin: format!("{:?}", r.path.origin()).to_lowercase(),
            hops: r.path.hop_count(),
            min_profit: format!("{:.2}%", r.path.min_profit_percent()),
            score: format!("{:.3}", r.score),
            attempts: r.attempts,
            success_rate: if r.attempts == 0 {
                output::muted("-")
            } else {
                format!("{:.0}%", r.success_rate * 100.0)
            },
        })
        .collect();
    output::section("Scan candidates by score");
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
