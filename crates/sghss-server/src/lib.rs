//! HTTP boundary for the SGHSS clinical records backend.
//!
//! Routes dispatch JSON requests to the account, patient and appointment
//! services; all service failures funnel through one error-to-status
//! translation in [`api_error`].

pub mod api_error;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod state;

pub use config::{AppConfig, load_config};
pub use routes::build_router;
pub use state::AppState;
