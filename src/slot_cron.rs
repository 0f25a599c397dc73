//! Daily slot maintenance.
//!
//! Runs the expiry sweep and next-week generation every day at `SLOT_JOB_HOUR`
//! (UTC), and re-sends reminders for sessions starting within
//! `REMINDER_WINDOW_MINUTES`. With `--once` it performs a single sweep and
//! generation and exits, for use under an external scheduler.

use std::sync::Arc;

use color_eyre::eyre::{Result, eyre};
use dotenv::dotenv;
use timeline_api::config::parse_log_level;
use timeline_db::{DbConfig, PgStore, create_pool};
use timeline_engine::{Engine, EngineConfig, TracingNotifier};
use tokio::signal;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    let log_level = parse_log_level(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db_config = DbConfig::from_env()?;
    let config = EngineConfig::from_env()?;

    let db_pool = create_pool(&db_config.database_url, db_config.max_connections).await?;
    let engine = Engine::new(Arc::new(PgStore::new(db_pool)), Arc::new(TracingNotifier), config);
    let job = engine.daily_job();

    if once {
        let summary = job.run_daily().await;
        if summary.expired.is_none() || summary.generation.is_none() {
            return Err(eyre!("slot maintenance did not complete, see log for details"));
        }
        return Ok(());
    }

    tracing::info!("Slot jobs scheduled daily at {:02}:00 UTC", config.job_hour);
    job.run_until(shutdown_signal()).await;

    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
