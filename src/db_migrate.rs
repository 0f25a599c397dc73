use color_eyre::eyre::Result;
use dotenv::dotenv;
use timeline_db::{DbConfig, create_pool, schema::initialize_database};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db_config = DbConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db_pool = create_pool(&db_config.database_url, 1).await?;

    initialize_database(&db_pool).await?;

    Ok(())
}
