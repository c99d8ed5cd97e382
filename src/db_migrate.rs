use color_eyre::eyre::Result;
use dotenv::dotenv;
use smartclinic_db::config::StoreConfig;
use smartclinic_db::schema::{initialize_document_store, initialize_relational_schema};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = StoreConfig::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Connecting to relational store...");
    let relational_pool =
        smartclinic_db::create_pool(&config.database_url, config.max_connections).await?;
    initialize_relational_schema(&relational_pool).await?;

    info!("Connecting to document store...");
    let document_pool =
        smartclinic_db::create_pool(&config.document_database_url, config.max_connections)
            .await?;
    initialize_document_store(&document_pool).await?;

    info!("Both stores are ready.");
    Ok(())
}
