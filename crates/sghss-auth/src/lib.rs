//! Authentication for the SGHSS backend.
//!
//! Three pieces: Argon2id password hashing ([`password`]), the bearer
//! token service ([`token`]) and the axum extractor that guards protected
//! routes ([`extract`]).

pub mod error;
pub mod extract;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use extract::{AuthState, BearerAuth};
pub use token::{Claims, TokenService};
