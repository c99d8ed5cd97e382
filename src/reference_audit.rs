//! Lists prescriptions whose appointment no longer exists.
//!
//! Deleting an appointment never touches the prescription collection, so
//! stale references accumulate. This walks the collection and reports them;
//! it does not modify either store.

use color_eyre::eyre::Result;
use dotenv::dotenv;
use smartclinic_db::config::StoreConfig;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = StoreConfig::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let service = smartclinic_db::connect_service(&config).await?;
    let dangling = service.find_dangling_prescriptions().await?;

    if dangling.is_empty() {
        info!("No dangling appointment references found.");
        return Ok(());
    }

    for prescription in &dangling {
        if let Some(appointment_id) = prescription.appointment_id {
            warn!(
                "Prescription {} references missing appointment {}",
                prescription.id, appointment_id
            );
        }
    }
    info!("{} dangling prescriptions found.", dangling.len());

    Ok(())
}
