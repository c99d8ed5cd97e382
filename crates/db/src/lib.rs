pub mod config;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod schema;

use std::sync::Arc;

use eyre::{Result, WrapErr};
use smartclinic_core::ClinicService;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::config::StoreConfig;
use crate::repositories::{PgDocumentStore, PgRelationalStore};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Connects to both stores and wires them into a `ClinicService`.
///
/// The relational and document stores get separate pools even when they
/// share a server, so one can be unavailable while the other is not.
pub async fn connect_service(config: &StoreConfig) -> Result<ClinicService> {
    let relational_pool = create_pool(&config.database_url, config.max_connections)
        .await
        .wrap_err("Failed to connect to the relational store")?;
    let document_pool = create_pool(&config.document_database_url, config.max_connections)
        .await
        .wrap_err("Failed to connect to the document store")?;

    let relational = Arc::new(PgRelationalStore::new(relational_pool));
    let documents = Arc::new(PgDocumentStore::new(document_pool));

    Ok(ClinicService::new(relational.clone(), relational, documents))
}
