use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use timeline_api::config::ApiConfig;
use timeline_db::{DbConfig, PgStore, create_pool, schema::initialize_database};
use timeline_engine::{Engine, EngineConfig, TracingNotifier};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    let db_config = DbConfig::from_env()?;
    let engine_config = EngineConfig::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db_pool = create_pool(&db_config.database_url, db_config.max_connections).await?;
    initialize_database(&db_pool).await?;

    let engine = Engine::new(
        Arc::new(PgStore::new(db_pool)),
        Arc::new(TracingNotifier),
        engine_config,
    );
    tracing::info!(
        "Cancellation cutoff: {} minutes before session start",
        engine_config.cancel_cutoff_minutes
    );

    timeline_api::start_server(config, engine).await?;

    Ok(())
}
