//! Patient storage.
//!
//! Patients are soft-deleted: the `active` flag is cleared instead of
//! removing the row, and a deactivated patient can be reactivated later.

use chrono::{DateTime, NaiveDate, Utc};
use sghss_core::PageParams;
use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgConnection, PgPool};

use crate::error::{DbError, Result};

type PatientTuple = (
    i32,
    String,
    String,
    Option<NaiveDate>,
    Option<String>,
    Option<String>,
    Option<String>,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Patient record from the `patients` table.
#[derive(Debug, Clone)]
pub struct PatientRow {
    pub id: i32,
    pub name: String,
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientRow {
    fn from_tuple(row: PatientTuple) -> Self {
        Self {
            id: row.0,
            name: row.1,
            cpf: row.2,
            birth_date: row.3,
            address: row.4,
            phone: row.5,
            email: row.6,
            active: row.7,
            created_at: row.8,
            updated_at: row.9,
        }
    }
}

/// Fields for a new patient.
#[derive(Debug)]
pub struct NewPatient {
    pub name: String,
    pub cpf: String,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Mutable fields for a patient update. The handler resolves partial
/// patches into the full set before calling [`update`].
#[derive(Debug)]
pub struct PatientUpdate {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

const COLUMNS: &str =
    "id, name, cpf, birth_date, address, phone, email, active, created_at, updated_at";

/// Find a patient by id, regardless of the active flag.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<PatientRow>> {
    let row: Option<PatientTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM patients WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(PatientRow::from_tuple))
}

/// Check whether a CPF is already registered.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn cpf_in_use(pool: &PgPool, cpf: &str) -> Result<bool> {
    let row: Option<(i32,)> = query_as("SELECT id FROM patients WHERE cpf = $1")
        .bind(cpf)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Check whether an email belongs to a patient other than `exclude_id`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn email_in_use(pool: &PgPool, email: &str, exclude_id: Option<i32>) -> Result<bool> {
    let row: Option<(i32,)> =
        query_as("SELECT id FROM patients WHERE email = $1 AND id != COALESCE($2, -1)")
            .bind(email)
            .bind(exclude_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// List active patients in insertion order, optionally narrowed by a
/// search term matched against name (case-insensitive) or CPF.
///
/// Returns the page of rows and the total match count.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list(
    pool: &PgPool,
    params: PageParams,
    search: Option<&str>,
) -> Result<(Vec<PatientRow>, i64)> {
    let pattern = search.map(|s| format!("%{s}%"));

    let rows: Vec<PatientTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM patients \
         WHERE active AND ($1::text IS NULL OR name ILIKE $1 OR cpf LIKE $1) \
         ORDER BY id LIMIT $2 OFFSET $3"
    ))
    .bind(&pattern)
    .bind(params.per_page)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) = query_as(
        "SELECT COUNT(*) FROM patients \
         WHERE active AND ($1::text IS NULL OR name ILIKE $1 OR cpf LIKE $1)",
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((rows.into_iter().map(PatientRow::from_tuple).collect(), total))
}

/// Insert a new patient and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::UniqueViolation`] when the CPF or email collides,
/// or another error if the insert fails.
pub async fn insert(conn: &mut PgConnection, patient: NewPatient) -> Result<PatientRow> {
    let row: PatientTuple = query_as(&format!(
        "INSERT INTO patients (name, cpf, birth_date, address, phone, email) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
    ))
    .bind(&patient.name)
    .bind(&patient.cpf)
    .bind(patient.birth_date)
    .bind(&patient.address)
    .bind(&patient.phone)
    .bind(&patient.email)
    .fetch_one(conn)
    .await
    .map_err(|e| DbError::classify(e, "Paciente com este CPF ou email já existe"))?;

    Ok(PatientRow::from_tuple(row))
}

/// Replace the mutable fields of a patient and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::UniqueViolation`] on an email collision, or another
/// error if the update fails.
pub async fn update(
    conn: &mut PgConnection,
    id: i32,
    fields: PatientUpdate,
) -> Result<PatientRow> {
    let row: PatientTuple = query_as(&format!(
        "UPDATE patients SET name = $1, birth_date = $2, address = $3, phone = $4, \
         email = $5, updated_at = now() WHERE id = $6 RETURNING {COLUMNS}"
    ))
    .bind(&fields.name)
    .bind(fields.birth_date)
    .bind(&fields.address)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(id)
    .fetch_one(conn)
    .await
    .map_err(|e| DbError::classify(e, "Email já está em uso"))?;

    Ok(PatientRow::from_tuple(row))
}

/// Set the active flag, returning the updated row, or `None` when the
/// patient does not exist.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn set_active(
    conn: &mut PgConnection,
    id: i32,
    active: bool,
) -> Result<Option<PatientRow>> {
    let row: Option<PatientTuple> = query_as(&format!(
        "UPDATE patients SET active = $1, updated_at = now() \
         WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(active)
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(PatientRow::from_tuple))
}
