//! MailGate maintenance runner
//!
//! Expires stale verification codes, releases elapsed lockouts and retires
//! expired refresh tokens. Runs on the configured interval until Ctrl-C, or
//! a single sweep with `--once`.

use anyhow::{Context, Result};

use mg_infra::{initialize, load_config, telemetry::init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to initialize tracing")?;

    let once = std::env::args().any(|arg| arg == "--once");
    let mailgate = initialize(&config)
        .await
        .context("failed to initialize MailGate services")?;

    if once {
        let report = mailgate.maintenance.run_once().await;
        tracing::info!(?report, event = "maintenance_single_run", "Maintenance sweep finished");
        mailgate.database.close().await;
        anyhow::ensure!(report.is_clean(), "maintenance sweep reported {} error(s)", report.errors.len());
        return Ok(());
    }

    let handle = mailgate.maintenance.clone().start_background_task();
    if handle.is_none() {
        tracing::warn!(event = "maintenance_disabled", "Maintenance is disabled, exiting");
        mailgate.database.close().await;
        return Ok(());
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!(event = "maintenance_shutdown", "Shutting down maintenance runner");

    if let Some(handle) = handle {
        handle.abort();
    }
    mailgate.database.close().await;
    Ok(())
}
