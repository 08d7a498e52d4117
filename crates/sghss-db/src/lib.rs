//! PostgreSQL storage layer for the SGHSS backend.
//!
//! Four entity modules ([`users`], [`patients`], [`appointments`],
//! [`records`]) expose typed query functions. Reads take a [`PgPool`];
//! writes take a `&mut PgConnection` so handlers can run every mutation
//! inside one request-scoped transaction and commit explicitly.

pub mod appointments;
pub mod config;
pub mod error;
pub mod patients;
pub mod pool;
pub mod records;
pub mod schema;
pub mod users;

pub use config::PostgresConfig;
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use schema::ensure_schema;

pub use sqlx_core::error::Error as SqlxError;
pub use sqlx_postgres::{PgConnection, PgPool};
