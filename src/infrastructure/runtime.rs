//! Process lifecycle: wiring, the scan loop and shutdown.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::orchestration::{CycleOutcome, EngineContext, Orchestrator};
use crate::error::Result;
use crate::infrastructure::bootstrap::build_context;
use crate::infrastructure::config::settings::Config;

/// Build the engine from `config` and run until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the engine cannot be wired.
pub async fn run(config: Config) -> Result<()> {
    info!(dry_run = config.dry_run, "Starting cyclarb");
    let ctx = build_context(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
        let _ = shutdown_tx.send(true);
    });

    run_with_shutdown(ctx, shutdown_rx).await;
    info!("cyclarb stopped");
    Ok(())
}

/// Run the scan loop until `shutdown` flips to true.
pub async fn run_with_shutdown(ctx: EngineContext, shutdown: watch::Receiver<bool>) {
    Orchestrator::new(ctx).run(shutdown).await;
}

/// Run one cycle and log its summary.
pub async fn run_once(ctx: EngineContext) -> CycleOutcome {
    let outcome = Orchestrator::new(ctx).run_cycle().await;
    match &outcome {
        CycleOutcome::Skipped(reason) => info!(reason = ?reason, "Cycle skipped"),
        CycleOutcome::Completed(report) => info!(
            checked = report.summary.checked,
            opportunities = report.summary.opportunities,
            trades = report.summary.trades,
            successful = report.summary.successful,
            elapsed_ms = report.summary.elapsed.as_millis() as u64,
            "Cycle completed"
        ),
    }
    outcome
}
