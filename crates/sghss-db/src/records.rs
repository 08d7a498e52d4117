//! Visit note storage.
//!
//! A medical record (prontuário) belongs to exactly one appointment. The
//! at-most-one-record-per-appointment rule is checked in the service layer
//! before insert.

use chrono::{DateTime, Utc};
use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgConnection, PgPool};

use crate::error::Result;

type RecordTuple = (
    i32,
    i32,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

/// Visit note record from the `medical_records` table.
#[derive(Debug, Clone)]
pub struct RecordRow {
    pub id: i32,
    pub appointment_id: i32,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub requested_exams: Option<String>,
    pub clinical_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecordRow {
    fn from_tuple(row: RecordTuple) -> Self {
        Self {
            id: row.0,
            appointment_id: row.1,
            diagnosis: row.2,
            prescription: row.3,
            requested_exams: row.4,
            clinical_notes: row.5,
            created_at: row.6,
        }
    }
}

/// Free-text fields of a visit note. Blank strings are normalized to
/// `None` by the handler before they reach storage.
#[derive(Debug, Default)]
pub struct RecordFields {
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub requested_exams: Option<String>,
    pub clinical_notes: Option<String>,
}

const COLUMNS: &str =
    "id, appointment_id, diagnosis, prescription, requested_exams, clinical_notes, created_at";

/// Find a visit note by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<RecordRow>> {
    let row: Option<RecordTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM medical_records WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(RecordRow::from_tuple))
}

/// Find the visit note attached to an appointment, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_appointment(
    pool: &PgPool,
    appointment_id: i32,
) -> Result<Option<RecordRow>> {
    let row: Option<RecordTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM medical_records WHERE appointment_id = $1"
    ))
    .bind(appointment_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(RecordRow::from_tuple))
}

/// Insert a visit note for an appointment and return the stored row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    appointment_id: i32,
    fields: RecordFields,
) -> Result<RecordRow> {
    let row: RecordTuple = query_as(&format!(
        "INSERT INTO medical_records \
         (appointment_id, diagnosis, prescription, requested_exams, clinical_notes) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(appointment_id)
    .bind(&fields.diagnosis)
    .bind(&fields.prescription)
    .bind(&fields.requested_exams)
    .bind(&fields.clinical_notes)
    .fetch_one(conn)
    .await?;

    Ok(RecordRow::from_tuple(row))
}

/// Replace the free-text fields of a visit note and return the stored row.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn update(
    conn: &mut PgConnection,
    id: i32,
    fields: RecordFields,
) -> Result<RecordRow> {
    let row: RecordTuple = query_as(&format!(
        "UPDATE medical_records SET diagnosis = $1, prescription = $2, \
         requested_exams = $3, clinical_notes = $4 WHERE id = $5 RETURNING {COLUMNS}"
    ))
    .bind(&fields.diagnosis)
    .bind(&fields.prescription)
    .bind(&fields.requested_exams)
    .bind(&fields.clinical_notes)
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(RecordRow::from_tuple(row))
}
