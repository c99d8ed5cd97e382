use std::collections::HashMap;

use eyre::Result;
use smartclinic_core::models::{Doctor, DoctorFilter, DoctorId, NewDoctor};
use sqlx::{PgConnection, Pool, Postgres};

use crate::models::{DbDoctor, DbDoctorSlot};

pub async fn create_doctor(pool: &Pool<Postgres>, doctor: &NewDoctor) -> Result<Doctor> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, DbDoctor>(
        r#"
        INSERT INTO doctors (name, specialization)
        VALUES ($1, $2)
        RETURNING id, name, specialization
        "#,
    )
    .bind(&doctor.name)
    .bind(&doctor.specialization)
    .fetch_one(&mut *tx)
    .await?;

    insert_slots(&mut tx, row.id, &doctor.available_times).await?;
    tx.commit().await?;

    tracing::debug!(
        "Created doctor: id={}, slots={}",
        row.id,
        doctor.available_times.len()
    );
    Ok(row.into_doctor(doctor.available_times.clone()))
}

pub async fn get_doctor_by_id(pool: &Pool<Postgres>, id: DoctorId) -> Result<Option<Doctor>> {
    let row = sqlx::query_as::<_, DbDoctor>(
        r#"
        SELECT id, name, specialization
        FROM doctors
        WHERE id = $1
        "#,
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        tracing::debug!("Doctor not found: id={}", id);
        return Ok(None);
    };

    let mut doctors = attach_slots(pool, vec![row]).await?;
    Ok(doctors.pop())
}

pub async fn get_all_doctors(pool: &Pool<Postgres>) -> Result<Vec<Doctor>> {
    let rows = sqlx::query_as::<_, DbDoctor>(
        r#"
        SELECT id, name, specialization
        FROM doctors
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    attach_slots(pool, rows).await
}

pub async fn filter_doctors(pool: &Pool<Postgres>, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
    let rows = sqlx::query_as::<_, DbDoctor>(
        r#"
        SELECT d.id, d.name, d.specialization
        FROM doctors d
        WHERE ($1::text IS NULL OR POSITION(LOWER($1) IN LOWER(d.name)) > 0)
          AND ($2::text IS NULL OR EXISTS (
                SELECT 1 FROM doctor_available_times t
                WHERE t.doctor_id = d.id AND t.slot = $2
              ))
          AND ($3::text IS NULL OR LOWER(d.specialization) = LOWER($3))
        ORDER BY d.id ASC
        "#,
    )
    .bind(filter.name_criterion())
    .bind(filter.time_criterion())
    .bind(filter.specialization_criterion())
    .fetch_all(pool)
    .await?;

    tracing::debug!("Doctor filter matched {} rows", rows.len());
    attach_slots(pool, rows).await
}

/// Overwrites name, specialization and the whole slot list.
pub async fn update_doctor(pool: &Pool<Postgres>, doctor: &Doctor) -> Result<Option<Doctor>> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, DbDoctor>(
        r#"
        UPDATE doctors
        SET name = $2, specialization = $3
        WHERE id = $1
        RETURNING id, name, specialization
        "#,
    )
    .bind(doctor.id.0)
    .bind(&doctor.name)
    .bind(&doctor.specialization)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        tx.rollback().await?;
        return Ok(None);
    };

    clear_slots(&mut tx, row.id).await?;
    insert_slots(&mut tx, row.id, &doctor.available_times).await?;
    tx.commit().await?;

    Ok(Some(row.into_doctor(doctor.available_times.clone())))
}

pub async fn replace_slots(
    pool: &Pool<Postgres>,
    id: DoctorId,
    times: &[String],
) -> Result<Option<Doctor>> {
    let mut tx = pool.begin().await?;

    let Some(row) = lock_doctor(&mut tx, id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    clear_slots(&mut tx, row.id).await?;
    insert_slots(&mut tx, row.id, times).await?;
    tx.commit().await?;

    tracing::debug!("Replaced slots: doctor_id={}, slots={}", id, times.len());
    Ok(Some(row.into_doctor(times.to_vec())))
}

pub async fn append_slot(
    pool: &Pool<Postgres>,
    id: DoctorId,
    slot: &str,
) -> Result<Option<Doctor>> {
    let mut tx = pool.begin().await?;

    let Some(row) = lock_doctor(&mut tx, id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    insert_slots(&mut tx, row.id, &[slot.to_string()]).await?;
    let times = load_slots(&mut tx, row.id).await?;
    tx.commit().await?;

    Ok(Some(row.into_doctor(times)))
}

pub async fn withdraw_slot(
    pool: &Pool<Postgres>,
    id: DoctorId,
    slot: &str,
) -> Result<Option<Doctor>> {
    let mut tx = pool.begin().await?;

    let Some(row) = lock_doctor(&mut tx, id).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    if !take_first_slot(&mut tx, row.id, slot).await? {
        tracing::debug!("Slot not offered: doctor_id={}, slot={}", id, slot);
        tx.rollback().await?;
        return Ok(None);
    }

    let times = load_slots(&mut tx, row.id).await?;
    tx.commit().await?;

    Ok(Some(row.into_doctor(times)))
}

pub async fn delete_doctor(pool: &Pool<Postgres>, id: DoctorId) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM doctors
        WHERE id = $1
        "#,
    )
    .bind(id.0)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Locks the doctor row until the surrounding transaction ends. Every slot
/// mutation goes through this lock, booking included.
pub(crate) async fn lock_doctor(
    conn: &mut PgConnection,
    id: DoctorId,
) -> Result<Option<DbDoctor>> {
    let row = sqlx::query_as::<_, DbDoctor>(
        r#"
        SELECT id, name, specialization
        FROM doctors
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id.0)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Deletes the lowest-positioned entry equal to `slot`. Returns whether one existed.
pub(crate) async fn take_first_slot(
    conn: &mut PgConnection,
    doctor_id: i64,
    slot: &str,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, i32>(
        r#"
        DELETE FROM doctor_available_times
        WHERE doctor_id = $1
          AND position = (
              SELECT MIN(position) FROM doctor_available_times
              WHERE doctor_id = $1 AND slot = $2
          )
        RETURNING position
        "#,
    )
    .bind(doctor_id)
    .bind(slot)
    .fetch_optional(conn)
    .await?;

    Ok(taken.is_some())
}

async fn clear_slots(conn: &mut PgConnection, doctor_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM doctor_available_times
        WHERE doctor_id = $1
        "#,
    )
    .bind(doctor_id)
    .execute(conn)
    .await?;

    Ok(())
}

async fn load_slots(conn: &mut PgConnection, doctor_id: i64) -> Result<Vec<String>> {
    let slots = sqlx::query_scalar::<_, String>(
        r#"
        SELECT slot
        FROM doctor_available_times
        WHERE doctor_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(conn)
    .await?;

    Ok(slots)
}

/// Appends `slots` after the doctor's current last position.
pub(crate) async fn insert_slots(
    conn: &mut PgConnection,
    doctor_id: i64,
    slots: &[String],
) -> Result<()> {
    if slots.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO doctor_available_times (doctor_id, position, slot)
        SELECT $1,
               COALESCE((SELECT MAX(position) + 1 FROM doctor_available_times WHERE doctor_id = $1), 0)
                 + (t.ord - 1)::int,
               t.slot
        FROM UNNEST($2::text[]) WITH ORDINALITY AS t(slot, ord)
        "#,
    )
    .bind(doctor_id)
    .bind(slots)
    .execute(conn)
    .await?;

    Ok(())
}

/// Loads slot lists for `rows` in one query, keeping the row order.
async fn attach_slots(pool: &Pool<Postgres>, rows: Vec<DbDoctor>) -> Result<Vec<Doctor>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let slots = sqlx::query_as::<_, DbDoctorSlot>(
        r#"
        SELECT doctor_id, position, slot
        FROM doctor_available_times
        WHERE doctor_id = ANY($1)
        ORDER BY doctor_id ASC, position ASC
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_doctor: HashMap<i64, Vec<String>> = HashMap::new();
    for slot in slots {
        by_doctor.entry(slot.doctor_id).or_default().push(slot.slot);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let times = by_doctor.remove(&row.id).unwrap_or_default();
            row.into_doctor(times)
        })
        .collect())
}
