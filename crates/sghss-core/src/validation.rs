//! Pure validation helpers for the identifiers the system accepts.
//!
//! These mirror the rules enforced at registration and patient intake:
//! CPF is exactly 11 digits after stripping separators, phone numbers are
//! 10 or 11 digits, emails match a conservative pattern, passwords have a
//! minimum length, and dates use fixed wire formats.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{ApiError, Result};

/// Wire format for calendar dates (birth dates, date filters).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for appointment timestamps, minute precision.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Strip non-digit characters from a CPF and check it has exactly 11 digits.
///
/// Returns the normalized digits-only CPF, or `None` when invalid.
pub fn normalize_cpf(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 11).then_some(digits)
}

/// Check an email against the accepted format.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Check a phone number: 10 or 11 digits after stripping separators.
pub fn is_valid_phone(raw: &str) -> bool {
    let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
    (10..=11).contains(&digits)
}

/// Check a password against the minimum strength criteria.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(
            "A senha deve ter pelo menos 6 caracteres",
        ));
    }
    Ok(())
}

/// Parse a calendar date in the fixed `YYYY-MM-DD` wire format.
pub fn parse_date(value: &str, error_message: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ApiError::validation(error_message))
}

/// Parse an appointment timestamp in the fixed `YYYY-MM-DD HH:MM` wire format.
pub fn parse_datetime(value: &str, error_message: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| ApiError::validation(error_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpf_accepts_eleven_digits() {
        assert_eq!(
            normalize_cpf("12345678901").as_deref(),
            Some("12345678901")
        );
    }

    #[test]
    fn test_cpf_strips_separators() {
        assert_eq!(
            normalize_cpf("123.456.789-01").as_deref(),
            Some("12345678901")
        );
    }

    #[test]
    fn test_cpf_rejects_wrong_length() {
        assert!(normalize_cpf("1234567890").is_none());
        assert!(normalize_cpf("123456789012").is_none());
        assert!(normalize_cpf("").is_none());
        // letters are stripped, leaving too few digits
        assert!(normalize_cpf("abc45678901").is_none());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("dr@x.com"));
        assert!(is_valid_email("ana.souza+clinic@example.com.br"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_phone_digit_count() {
        assert!(is_valid_phone("(11) 98765-4321"));
        assert!(is_valid_phone("1187654321"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("123456789012"));
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(validate_password("senha123").is_ok());
        assert!(validate_password("123456").is_ok());
        let err = validate_password("12345").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("1990-05-20", "bad date").is_ok());
        assert!(parse_date("20/05/1990", "bad date").is_err());
        assert!(parse_date("1990-02-30", "bad date").is_err());
    }

    #[test]
    fn test_parse_datetime_minute_precision() {
        let dt = parse_datetime("2031-01-01 10:00", "bad datetime").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2031-01-01 10:00");
        assert!(parse_datetime("2031-01-01T10:00", "bad datetime").is_err());
        assert!(parse_datetime("2031-01-01 10:00:30", "bad datetime").is_err());
    }
}
