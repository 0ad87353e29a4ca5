use chrono::{SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FormError;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Fields that must be present and non-blank, in the order they are reported
pub const REQUIRED_FIELDS: [&str; 5] = ["firstName", "lastName", "email", "subject", "message"];

/// A submission after defaults were applied and the required checks passed
///
/// Values are kept exactly as submitted; whitespace cleanup and email
/// normalization happen later in the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedFields {
    pub timestamp: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: String,
    pub message: String,
}

impl ValidatedFields {
    /// Look up a field by its form name
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "timestamp" => Some(&self.timestamp),
            "firstName" => Some(&self.first_name),
            "lastName" => Some(&self.last_name),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            "company" => Some(&self.company),
            "subject" => Some(&self.subject),
            "message" => Some(&self.message),
            _ => None,
        }
    }
}

/// Check whether an email has the `local@domain.tld` shape
///
/// No RFC validation: any non-whitespace, non-`@` run is accepted for each
/// of the three parts.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validate raw form parameters
///
/// Applies defaults (current time for `timestamp`, empty text for the
/// optional `phone` and `company`), then checks the required fields and
/// finally the email shape.
///
/// # Arguments
/// * `raw` - Field name to value mapping as received
///
/// # Returns
/// * `Result<ValidatedFields, FormError>` - The field set, or
///   `MissingFields` listing every blank required field, or `InvalidEmail`
pub fn validate(raw: &HashMap<String, String>) -> Result<ValidatedFields, FormError> {
    let field = |name: &str| raw.get(name).cloned().unwrap_or_default();

    let timestamp = match raw.get("timestamp") {
        Some(ts) if !ts.is_empty() => ts.clone(),
        _ => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let fields = ValidatedFields {
        timestamp,
        first_name: field("firstName"),
        last_name: field("lastName"),
        email: field("email"),
        phone: field("phone"),
        company: field("company"),
        subject: field("subject"),
        message: field("message"),
    };

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|name| fields.get(name).is_none_or(|v| v.trim().is_empty()))
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(FormError::MissingFields(missing));
    }

    if !is_valid_email(&fields.email) {
        return Err(FormError::InvalidEmail);
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> HashMap<String, String> {
        form(&[
            ("firstName", "John"),
            ("lastName", "Doe"),
            ("email", "john@example.com"),
            ("subject", "Hi"),
            ("message", "hello"),
        ])
    }

    #[test]
    fn accepts_complete_form_and_fills_defaults() {
        let fields = validate(&complete()).unwrap();
        assert_eq!(fields.phone, "");
        assert_eq!(fields.company, "");
        assert!(!fields.timestamp.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&fields.timestamp).is_ok());
    }

    #[test]
    fn keeps_supplied_timestamp() {
        let mut raw = complete();
        raw.insert("timestamp".into(), "2025-06-01T10:00:00Z".into());
        assert_eq!(validate(&raw).unwrap().timestamp, "2025-06-01T10:00:00Z");
    }

    #[test]
    fn reports_every_missing_field() {
        let raw = form(&[("lastName", "Doe"), ("subject", "   ")]);
        assert_eq!(
            validate(&raw),
            Err(FormError::MissingFields(vec![
                "firstName".into(),
                "email".into(),
                "subject".into(),
                "message".into(),
            ]))
        );
    }

    #[test]
    fn each_single_missing_field_is_named() {
        for name in REQUIRED_FIELDS {
            let mut raw = complete();
            raw.remove(name);
            assert_eq!(
                validate(&raw),
                Err(FormError::MissingFields(vec![name.to_string()]))
            );
        }
    }

    #[test]
    fn missing_fields_win_over_bad_email() {
        let mut raw = complete();
        raw.insert("email".into(), "not-an-email".into());
        raw.remove("message");
        assert_eq!(
            validate(&raw),
            Err(FormError::MissingFields(vec!["message".into()]))
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["johnexample.com", "john@examplecom", "jo hn@example.com", "a@b@c.d", "@x.y"] {
            let mut raw = complete();
            raw.insert("email".into(), bad.into());
            assert_eq!(validate(&raw), Err(FormError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn email_shape_is_loose() {
        assert!(is_valid_email("JOHN@EXAMPLE.COM"));
        assert!(is_valid_email("a+b@sub.domain.org"));
        assert!(!is_valid_email(" john@example.com"));
    }
}
