use serde::Serialize;
use serde_json::{Map, Value};

const COUNTRY_MAX_LEN: usize = 100;
const CAPTCHA_MAX_LEN: usize = 10;

/// Outcome of [`validate_form_data`]. One error string per violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// The message surfaced to the caller when validation fails.
    #[must_use]
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Checks submitted values against the per-field rules.
///
/// Only `country` and `captcha` are inspected; unknown fields are ignored.
/// Absent, `null`, `false` and empty-string values count as not present.
#[must_use]
pub fn validate_form_data(data: &Map<String, Value>) -> ValidationReport {
    let mut errors = Vec::new();

    if let Some(country) = present(data, "country") {
        match country.as_str() {
            None => errors.push("Country must be a string".to_owned()),
            Some(s) if s.chars().count() > COUNTRY_MAX_LEN => {
                errors.push("Country value exceeds maximum length".to_owned());
            }
            Some(_) => {}
        }
    }

    if let Some(captcha) = present(data, "captcha") {
        match captcha.as_str() {
            None => errors.push("CAPTCHA must be a string".to_owned()),
            Some(s) if s.chars().count() > CAPTCHA_MAX_LEN => {
                errors.push("CAPTCHA value exceeds maximum length".to_owned());
            }
            Some(s) if !s.bytes().all(|b| b.is_ascii_alphanumeric()) => {
                errors.push("CAPTCHA contains invalid characters".to_owned());
            }
            Some(_) => {}
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn present<'a>(data: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    data.get(field).filter(|v| match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: Value) -> ValidationReport {
        validate_form_data(value.as_object().unwrap())
    }

    #[test]
    fn empty_object_is_valid() {
        let report = check(json!({}));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn overlong_country_is_rejected() {
        let report = check(json!({"country": "A".repeat(101)}));
        assert!(!report.valid);
        assert_eq!(report.errors, ["Country value exceeds maximum length"]);
    }

    #[test]
    fn country_at_limit_is_accepted() {
        assert!(check(json!({"country": "A".repeat(100)})).valid);
    }

    #[test]
    fn captcha_with_punctuation_is_rejected() {
        let report = check(json!({"captcha": "ab-12"}));
        assert!(!report.valid);
        assert_eq!(report.first_error(), Some("CAPTCHA contains invalid characters"));
    }

    #[test]
    fn alphanumeric_captcha_is_valid() {
        assert!(check(json!({"captcha": "AB12"})).valid);
    }

    #[test]
    fn overlong_captcha_reports_length_only() {
        let report = check(json!({"captcha": "abc-defghijk"}));
        assert_eq!(report.errors, ["CAPTCHA value exceeds maximum length"]);
    }

    #[test]
    fn non_string_values_are_type_errors() {
        let report = check(json!({"country": 12, "captcha": ["x"]}));
        assert_eq!(
            report.errors,
            ["Country must be a string", "CAPTCHA must be a string"]
        );
    }

    #[test]
    fn errors_accumulate_without_short_circuit() {
        let report = check(json!({"country": "B".repeat(150), "captcha": "x$"}));
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn empty_and_unknown_fields_are_ignored() {
        let report = check(json!({"country": "", "captcha": null, "passport": "$$$"}));
        assert!(report.valid);
    }

    #[test]
    fn non_ascii_letters_fail_charset() {
        assert!(!check(json!({"captcha": "ÄB12"})).valid);
    }
}
