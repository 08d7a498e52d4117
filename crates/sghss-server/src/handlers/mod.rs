//! Request handlers, one module per service.

pub mod appointments;
pub mod auth;
pub mod patients;
pub mod status;

use serde_json::Value;

/// Read a string field from a JSON body, trimmed; absent, null and
/// non-string values come back as an empty string.
pub(crate) fn str_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Read a secret field untrimmed; leading/trailing whitespace is part of
/// the secret.
pub(crate) fn secret_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Read a positive integer id field; zero, absent and non-numeric values
/// come back as `None`.
pub(crate) fn id_field(data: &Value, key: &str) -> Option<i32> {
    data.get(key)
        .and_then(Value::as_i64)
        .filter(|v| *v > 0)
        .and_then(|v| i32::try_from(v).ok())
}

/// Normalize a trimmed string into an optional text value: blank means
/// absent.
pub(crate) fn opt_text(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Normalize an optional id from the query string: zero and negative
/// values mean "no filter", the same way [`id_field`] treats them.
pub(crate) fn positive_id(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_field_trims_and_defaults() {
        let data = json!({"nome": "  Ana  ", "idade": 30, "cpf": null});
        assert_eq!(str_field(&data, "nome"), "Ana");
        assert_eq!(str_field(&data, "cpf"), "");
        assert_eq!(str_field(&data, "idade"), "");
        assert_eq!(str_field(&data, "ausente"), "");
    }

    #[test]
    fn test_secret_field_keeps_whitespace() {
        let data = json!({"password": " senha "});
        assert_eq!(secret_field(&data, "password"), " senha ");
    }

    #[test]
    fn test_id_field_rejects_zero_and_garbage() {
        let data = json!({"a": 5, "b": 0, "c": "7", "d": -1});
        assert_eq!(id_field(&data, "a"), Some(5));
        assert_eq!(id_field(&data, "b"), None);
        assert_eq!(id_field(&data, "c"), None);
        assert_eq!(id_field(&data, "d"), None);
    }

    #[test]
    fn test_opt_text() {
        assert_eq!(opt_text(String::new()), None);
        assert_eq!(opt_text("x".into()), Some("x".into()));
    }

    #[test]
    fn test_positive_id_drops_zero_and_negative() {
        assert_eq!(positive_id(Some(3)), Some(3));
        assert_eq!(positive_id(Some(0)), None);
        assert_eq!(positive_id(Some(-2)), None);
        assert_eq!(positive_id(None), None);
    }
}
