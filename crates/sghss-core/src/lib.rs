//! Shared foundation for the SGHSS clinical records backend.
//!
//! This crate carries the pieces every other crate agrees on: the error
//! taxonomy translated at the HTTP boundary, pagination metadata, and the
//! pure validation helpers for the identifiers the system accepts
//! (CPF, email, phone, password, calendar dates).

pub mod domain;
pub mod error;
pub mod pagination;
pub mod validation;

pub use domain::{AppointmentModality, AppointmentStatus, DEFAULT_USER_KIND};
pub use error::{ApiError, ErrorCategory, Result};
pub use pagination::{PageParams, Pagination};
