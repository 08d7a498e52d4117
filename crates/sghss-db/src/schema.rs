//! Schema bootstrap for the SGHSS database.
//!
//! Tables are created idempotently at startup. The one-record-per-appointment
//! rule is an application-level check, so `medical_records.appointment_id`
//! deliberately carries no unique constraint; the same goes for the
//! (doctor, scheduled_at) double-booking check on `appointments`.

use sqlx_core::query::query;
use sqlx_postgres::PgPool;
use tracing::{debug, instrument};

use crate::error::Result;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            SERIAL PRIMARY KEY,
        username      VARCHAR(80) NOT NULL UNIQUE,
        password_hash VARCHAR(200) NOT NULL,
        email         VARCHAR(120) UNIQUE,
        user_kind     VARCHAR(20) NOT NULL DEFAULT 'recepcionista',
        active        BOOLEAN NOT NULL DEFAULT TRUE,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS patients (
        id          SERIAL PRIMARY KEY,
        name        VARCHAR(120) NOT NULL,
        cpf         VARCHAR(11) NOT NULL UNIQUE,
        birth_date  DATE,
        address     VARCHAR(200),
        phone       VARCHAR(20),
        email       VARCHAR(120) UNIQUE,
        active      BOOLEAN NOT NULL DEFAULT TRUE,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id           SERIAL PRIMARY KEY,
        patient_id   INTEGER NOT NULL REFERENCES patients (id),
        doctor_id    INTEGER NOT NULL REFERENCES users (id),
        scheduled_at TIMESTAMP NOT NULL,
        modality     VARCHAR(20) NOT NULL DEFAULT 'presencial',
        status       VARCHAR(20) NOT NULL DEFAULT 'agendada',
        notes        TEXT,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS medical_records (
        id              SERIAL PRIMARY KEY,
        appointment_id  INTEGER NOT NULL REFERENCES appointments (id),
        diagnosis       TEXT,
        prescription    TEXT,
        requested_exams TEXT,
        clinical_notes  TEXT,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_patients_name ON patients (name)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_doctor ON appointments (doctor_id, scheduled_at)",
    "CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments (patient_id)",
    "CREATE INDEX IF NOT EXISTS idx_records_appointment ON medical_records (appointment_id)",
];

/// Creates all tables and indexes if they do not exist yet.
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for stmt in DDL {
        query(stmt).execute(pool).await?;
    }
    debug!("Database schema is up to date");
    Ok(())
}
