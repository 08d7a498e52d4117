//! Account storage.
//!
//! User accounts carry the login handle, the Argon2 password hash and the
//! role tag. Accounts are never hard-deleted.

use chrono::{DateTime, Utc};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgConnection, PgPool};

use crate::error::{DbError, Result};

type UserTuple = (
    i32,
    String,
    String,
    Option<String>,
    String,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Account record from the `users` table.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub user_kind: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    fn from_tuple(row: UserTuple) -> Self {
        Self {
            id: row.0,
            username: row.1,
            password_hash: row.2,
            email: row.3,
            user_kind: row.4,
            active: row.5,
            created_at: row.6,
            updated_at: row.7,
        }
    }
}

/// Fields for a new account.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub user_kind: String,
}

const COLUMNS: &str =
    "id, username, password_hash, email, user_kind, active, created_at, updated_at";

/// Find an account by its id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<UserRow>> {
    let row: Option<UserTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::from_tuple))
}

/// Find an account by username, active or not.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRow>> {
    let row: Option<UserTuple> = query_as(&format!(
        "SELECT {COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::from_tuple))
}

/// Check whether an email is already attached to an account.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn email_in_use(pool: &PgPool, email: &str) -> Result<bool> {
    let row: Option<(i32,)> = query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Insert a new account and return the stored row.
///
/// # Errors
///
/// Returns [`DbError::UniqueViolation`] when the username or email is
/// already taken, or another error if the insert fails.
pub async fn insert(conn: &mut PgConnection, user: NewUser) -> Result<UserRow> {
    let row: UserTuple = query_as(&format!(
        "INSERT INTO users (username, password_hash, email, user_kind) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    ))
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.email)
    .bind(&user.user_kind)
    .fetch_one(conn)
    .await
    .map_err(|e| DbError::classify(e, "Nome de usuário ou email já está em uso"))?;

    Ok(UserRow::from_tuple(row))
}

/// Replace the stored password hash for an account.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn update_password(conn: &mut PgConnection, id: i32, password_hash: &str) -> Result<()> {
    query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(conn)
        .await?;

    Ok(())
}
