//! Handler for the `run` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::application::orchestration::{CycleOutcome, CycleReport};
use crate::error::Result;
use crate::infrastructure::bootstrap::build_context;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime;

#[derive(Tabled)]
struct TradeRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Wallet")]
    wallet: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Result")]
    result: &'static str,
}

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if output::is_json() {
        config.logging.format = "json".into();
    }
    config.init_logging();
    print_startup(&config);

    if !args.once {
        return runtime::run(config).await;
    }

    let ctx = build_context(&config).await?;
    let outcome = runtime::run_once(ctx).await;
    print_outcome(&outcome);
    Ok(())
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Mode", if config.dry_run { "dry-run" } else { "live" });
    output::field("Venue", &config.venue.base_url);
    output::field("Scan", format!("{:?}", config.catalog.mode).to_lowercase());
    output::field("Static paths", config.paths.len());
    output::field("Wallets", config.wallets.len());
    if output::verbosity() > 0 {
        output::field("Interval", format!("{}s", config.scanner.interval_secs));
        output::field("State dir", config.storage.dir.display());
    }
    if !config.dry_run {
        output::warning("Live mode: executions are broadcast");
    }
}

fn print_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Skipped(reason) => {
            if output::is_json() {
                output::json_output(&json!({
                    "command": "run",
                    "outcome": "skipped",
                    "reason": reason,
                }));
            } else {
                output::warning(&format!("Cycle skipped: {reason:?}"));
            }
        }
        CycleOutcome::Completed(report) => {
            if output::is_json() {
                output::json_output(&json!({
                    "command": "run",
                    "outcome": "completed",
                    "report": &**report,
                }));
            } else {
                print_report(report);
            }
        }
    }
}

fn print_report(report: &CycleReport) {
    let summary = &report.summary;
    if summary.opportunities == 0 {
        output::note("No opportunities this cycle");
    } else {
        output::success(&format!("{} opportunities found", summary.opportunities));
    }
    output::section("Cycle");
    output::field("Checked", summary.checked);
    output::field("Failed", summary.failed);
    output::field("Skipped", summary.skipped);
    output::field("Opportunities", summary.opportunities);
    output::field(
        "Trades",
        format!("{} ({} successful)", summary.trades, summary.successful),
    );
    output::field("Elapsed", format!("{}ms", summary.elapsed.as_millis()));
    if output::verbosity() > 0 {
        let gateway = &report.gateway;
        output::field(
            "Quote calls",
            format!(
                "{} ({} rate limited, {} timed out)",
                gateway.calls, gateway.rate_limited, gateway.timeouts
            ),
        );
    }

    if !report.trades.is_empty() {
        let rows: Vec<TradeRow> = report
            .trades
            .iter()
            .map(|t| TradeRow {
                path: t.path.to_string(),
                wallet: t.wallet.to_string(),
                amount: format!("{:.2}", t.amount),
                profit: output::percent(t.profit_percent),
                result: match (t.success, t.simulated) {
                    (true, true) => "simulated",
                    (true, false) => "executed",
                    (false, _) => "failed",
                },
            })
            .collect();
        output::section("Trades");
        output::lines(&Table::new(rows).to_string());
    }

    for skip in &report.skipped {
        output::note(&format!("{} not traded: {:?}", skip.path, skip.reason));
    }
}
