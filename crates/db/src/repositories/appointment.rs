use eyre::Result;
use smartclinic_core::models::{
    Appointment, AppointmentFilter, AppointmentId, AppointmentStatus, DoctorId, NewAppointment,
};
use sqlx::{PgConnection, Pool, Postgres};

use super::doctor::{lock_doctor, take_first_slot};
use crate::models::DbAppointment;

pub async fn get_appointment_by_id(
    pool: &Pool<Postgres>,
    id: AppointmentId,
) -> Result<Option<Appointment>> {
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, doctor_id, patient_name, appointment_time, status
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    row.map(Appointment::try_from).transpose()
}

pub async fn get_appointments_by_doctor_id(
    pool: &Pool<Postgres>,
    doctor_id: DoctorId,
) -> Result<Vec<Appointment>> {
    let rows = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, doctor_id, patient_name, appointment_time, status
        FROM appointments
        WHERE doctor_id = $1
        ORDER BY appointment_time ASC
        "#,
    )
    .bind(doctor_id.0)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Appointment::try_from).collect()
}

pub async fn search_appointments(
    pool: &Pool<Postgres>,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>> {
    let rows = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, doctor_id, patient_name, appointment_time, status
        FROM appointments
        WHERE ($1::bigint IS NULL OR doctor_id = $1)
          AND ($2::date IS NULL OR (appointment_time AT TIME ZONE 'UTC')::date = $2)
          AND ($3::text IS NULL OR POSITION(LOWER($3) IN LOWER(patient_name)) > 0)
          AND ($4::text IS NULL OR status = $4)
        ORDER BY appointment_time ASC, id ASC
        "#,
    )
    .bind(filter.doctor_id.map(|id| id.0))
    .bind(filter.date)
    .bind(filter.patient_name_criterion())
    .bind(filter.status.map(|status| status.as_str()))
    .fetch_all(pool)
    .await?;

    tracing::debug!("Appointment search matched {} rows", rows.len());
    rows.into_iter().map(Appointment::try_from).collect()
}

pub async fn update_appointment_status(
    pool: &Pool<Postgres>,
    id: AppointmentId,
    status: AppointmentStatus,
) -> Result<Option<Appointment>> {
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET status = $2
        WHERE id = $1
        RETURNING id, doctor_id, patient_name, appointment_time, status
        "#,
    )
    .bind(id.0)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(Appointment::try_from).transpose()
}

/// Prescriptions referencing the appointment are not touched.
pub async fn delete_appointment(pool: &Pool<Postgres>, id: AppointmentId) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id.0)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Takes the first matching slot off the doctor's list and records the
/// appointment in the same transaction. The doctor row is locked for the
/// duration so two bookings cannot take the same slot entry.
pub async fn book_appointment(
    pool: &Pool<Postgres>,
    doctor_id: DoctorId,
    slot: &str,
    appointment: &NewAppointment,
) -> Result<Option<Appointment>> {
    let mut tx = pool.begin().await?;

    if lock_doctor(&mut tx, doctor_id).await?.is_none() {
        tx.rollback().await?;
        return Ok(None);
    }

    if !take_first_slot(&mut tx, doctor_id.0, slot).await? {
        tracing::debug!("Slot not offered: doctor_id={}, slot={}", doctor_id, slot);
        tx.rollback().await?;
        return Ok(None);
    }

    let booked = insert_appointment(&mut tx, appointment).await?;
    tx.commit().await?;

    Ok(Some(booked))
}

async fn insert_appointment(
    conn: &mut PgConnection,
    appointment: &NewAppointment,
) -> Result<Appointment> {
    let row = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (doctor_id, patient_name, appointment_time, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, doctor_id, patient_name, appointment_time, status
        "#,
    )
    .bind(appointment.doctor_id.0)
    .bind(&appointment.patient_name)
    .bind(appointment.appointment_time)
    .bind(AppointmentStatus::Scheduled.as_str())
    .fetch_one(conn)
    .await?;

    tracing::debug!(
        "Created appointment: id={}, doctor_id={}",
        row.id,
        row.doctor_id
    );
    Appointment::try_from(row)
}
