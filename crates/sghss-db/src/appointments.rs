//! Appointment storage.
//!
//! Appointments reference one patient and one provider account. The
//! double-booking rule (same doctor, same instant, both still scheduled)
//! is a read-then-write check in the service layer, so there is no unique
//! constraint backing it.

use chrono::{DateTime, NaiveDateTime, Utc};
use sghss_core::PageParams;
use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgConnection, PgPool};

use crate::error::Result;

type AppointmentTuple = (
    i32,
    i32,
    i32,
    NaiveDateTime,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

type ListTuple = (
    i32,
    i32,
    i32,
    NaiveDateTime,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
    String,
    String,
);

/// Appointment record from the `appointments` table.
#[derive(Debug, Clone)]
pub struct AppointmentRow {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub modality: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentRow {
    fn from_tuple(row: AppointmentTuple) -> Self {
        Self {
            id: row.0,
            patient_id: row.1,
            doctor_id: row.2,
            scheduled_at: row.3,
            modality: row.4,
            status: row.5,
            notes: row.6,
            created_at: row.7,
            updated_at: row.8,
        }
    }
}

/// Appointment row enriched with denormalized patient and provider names
/// for list responses.
#[derive(Debug, Clone)]
pub struct AppointmentListRow {
    pub appointment: AppointmentRow,
    pub patient_name: String,
    pub doctor_username: String,
}

/// Fields for a new appointment.
#[derive(Debug)]
pub struct NewAppointment {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub modality: String,
    pub notes: Option<String>,
}

/// Filters accepted by [`list`]. `None` fields do not narrow the result.
#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<i32>,
    pub doctor_id: Option<i32>,
    pub status: Option<String>,
    pub scheduled_from: Option<NaiveDateTime>,
    pub scheduled_before: Option<NaiveDateTime>,
}

const COLUMNS: &str = "id, patient_id, doctor_id, scheduled_at, modality, status, notes, \
                       created_at, updated_at";

/// Find an appointment by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<AppointmentRow>> {
    let row: Option<AppointmentTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AppointmentRow::from_tuple))
}

/// Check whether the doctor already has a *scheduled* appointment at the
/// exact same instant.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn slot_taken(
    pool: &PgPool,
    doctor_id: i32,
    scheduled_at: NaiveDateTime,
) -> Result<bool> {
    let row: Option<(i32,)> = query_as(
        "SELECT id FROM appointments \
         WHERE doctor_id = $1 AND scheduled_at = $2 AND status = 'agendada'",
    )
    .bind(doctor_id)
    .bind(scheduled_at)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// List appointments, newest scheduled first, with the patient name and
/// provider username joined in. Returns the page and the total match count.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(
    pool: &PgPool,
    filter: &AppointmentFilter,
    params: PageParams,
) -> Result<(Vec<AppointmentListRow>, i64)> {
    const WHERE: &str = "($1::int4 IS NULL OR a.patient_id = $1) \
         AND ($2::int4 IS NULL OR a.doctor_id = $2) \
         AND ($3::text IS NULL OR a.status = $3) \
         AND ($4::timestamp IS NULL OR a.scheduled_at >= $4) \
         AND ($5::timestamp IS NULL OR a.scheduled_at < $5)";

    let rows: Vec<ListTuple> = query_as(&format!(
        "SELECT a.id, a.patient_id, a.doctor_id, a.scheduled_at, a.modality, a.status, \
                a.notes, a.created_at, a.updated_at, p.name, u.username \
         FROM appointments a \
         JOIN patients p ON p.id = a.patient_id \
         JOIN users u ON u.id = a.doctor_id \
         WHERE {WHERE} \
         ORDER BY a.scheduled_at DESC LIMIT $6 OFFSET $7"
    ))
    .bind(filter.patient_id)
    .bind(filter.doctor_id)
    .bind(&filter.status)
    .bind(filter.scheduled_from)
    .bind(filter.scheduled_before)
    .bind(params.per_page)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) = query_as(&format!(
        "SELECT COUNT(*) FROM appointments a WHERE {WHERE}"
    ))
    .bind(filter.patient_id)
    .bind(filter.doctor_id)
    .bind(&filter.status)
    .bind(filter.scheduled_from)
    .bind(filter.scheduled_before)
    .fetch_one(pool)
    .await?;

    let rows = rows
        .into_iter()
        .map(|t| AppointmentListRow {
            appointment: AppointmentRow::from_tuple((
                t.0, t.1, t.2, t.3, t.4, t.5, t.6, t.7, t.8,
            )),
            patient_name: t.9,
            doctor_username: t.10,
        })
        .collect();

    Ok((rows, total))
}

/// Insert a new appointment with status `agendada` and return the row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    appointment: NewAppointment,
) -> Result<AppointmentRow> {
    let row: AppointmentTuple = query_as(&format!(
        "INSERT INTO appointments (patient_id, doctor_id, scheduled_at, modality, notes) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    ))
    .bind(appointment.patient_id)
    .bind(appointment.doctor_id)
    .bind(appointment.scheduled_at)
    .bind(&appointment.modality)
    .bind(&appointment.notes)
    .fetch_one(conn)
    .await?;

    Ok(AppointmentRow::from_tuple(row))
}

/// Set the status of an appointment, returning the updated row, or `None`
/// when the appointment does not exist.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_status(
    conn: &mut PgConnection,
    id: i32,
    status: &str,
) -> Result<Option<AppointmentRow>> {
    let row: Option<AppointmentTuple> = query_as(&format!(
        "UPDATE appointments SET status = $1, updated_at = now() \
         WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(AppointmentRow::from_tuple))
}
