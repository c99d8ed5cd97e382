//! The `prescriptions` collection.
//!
//! Each prescription is one schemaless JSONB document keyed by an opaque id.
//! Nothing here knows about the relational tables.

use eyre::Result;
use serde_json::json;
use smartclinic_core::models::{AppointmentId, Prescription, PrescriptionId};
use sqlx::types::Json;
use sqlx::{Pool, Postgres};

use crate::models::{DbPrescription, PrescriptionDocument};

/// Inserts or replaces the document with this id.
pub async fn put_prescription(pool: &Pool<Postgres>, prescription: &Prescription) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO prescriptions (id, document)
        VALUES ($1, $2)
        ON CONFLICT (id)
        DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()
        "#,
    )
    .bind(prescription.id.as_str())
    .bind(Json(PrescriptionDocument::from(prescription)))
    .execute(pool)
    .await?;

    tracing::debug!("Stored prescription document: id={}", prescription.id);
    Ok(())
}

pub async fn get_prescription_by_id(
    pool: &Pool<Postgres>,
    id: &PrescriptionId,
) -> Result<Option<Prescription>> {
    let row = sqlx::query_as::<_, DbPrescription>(
        r#"
        SELECT id, document
        FROM prescriptions
        WHERE id = $1
        "#,
    )
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Prescription::from))
}

pub async fn get_all_prescriptions(pool: &Pool<Postgres>) -> Result<Vec<Prescription>> {
    let rows = sqlx::query_as::<_, DbPrescription>(
        r#"
        SELECT id, document
        FROM prescriptions
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Prescription::from).collect())
}

pub async fn get_prescriptions_by_appointment_id(
    pool: &Pool<Postgres>,
    appointment_id: AppointmentId,
) -> Result<Vec<Prescription>> {
    let rows = sqlx::query_as::<_, DbPrescription>(
        r#"
        SELECT id, document
        FROM prescriptions
        WHERE document @> $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(Json(json!({ "appointmentId": appointment_id.0 })))
    .fetch_all(pool)
    .await?;

    tracing::debug!(
        "Found {} prescriptions for appointment {}",
        rows.len(),
        appointment_id
    );
    Ok(rows.into_iter().map(Prescription::from).collect())
}

pub async fn update_prescription(
    pool: &Pool<Postgres>,
    prescription: &Prescription,
) -> Result<Option<Prescription>> {
    let row = sqlx::query_as::<_, DbPrescription>(
        r#"
        UPDATE prescriptions
        SET document = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, document
        "#,
    )
    .bind(prescription.id.as_str())
    .bind(Json(PrescriptionDocument::from(prescription)))
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Prescription::from))
}

pub async fn delete_prescription(pool: &Pool<Postgres>, id: &PrescriptionId) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM prescriptions
        WHERE id = $1
        "#,
    )
    .bind(id.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
