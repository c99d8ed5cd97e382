use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const RELATIONAL_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_doctor_available_times_slot ON doctor_available_times(slot)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_doctor_id ON appointments(doctor_id)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_time ON appointments(appointment_time)",
];

/// Creates the doctor and appointment tables.
///
/// `appointments.doctor_id` deliberately has no foreign key: removing a
/// doctor must not cascade into appointments.
pub async fn initialize_relational_schema(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing relational schema...");

    // Create doctors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            specialization VARCHAR(255) NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Ordered slot list, one row per entry; duplicates allowed
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctor_available_times (
            doctor_id BIGINT NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            slot VARCHAR(255) NOT NULL,
            PRIMARY KEY (doctor_id, position)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id BIGSERIAL PRIMARY KEY,
            doctor_id BIGINT NOT NULL,
            patient_name VARCHAR(255) NOT NULL,
            appointment_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'scheduled'
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement each: prepared statements take a single command
    for statement in RELATIONAL_INDEXES {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Relational schema initialized successfully.");
    Ok(())
}

/// Creates the `prescriptions` collection: one schemaless JSONB document per id.
pub async fn initialize_document_store(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing prescription collection...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prescriptions (
            id TEXT PRIMARY KEY,
            document JSONB NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_prescriptions_document
            ON prescriptions USING GIN (document jsonb_path_ops);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Prescription collection initialized successfully.");
    Ok(())
}
