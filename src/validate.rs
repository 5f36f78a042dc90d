//! Declarative constraint validation (spec.md §4.B).
//!
//! Field tags (`required`, `min`, `max`, `len`, `email`, ...) are expressed
//! with the `validator` crate's derive macro on param/body records — the
//! same crate `RAprogramm-masterror` reaches for under its own `validator`
//! feature. This module is only the thin adapter from
//! `validator::ValidationErrors` to the framework's own `FieldError` list,
//! so the rest of the pipeline (the error writer, the JSON engine) never
//! has to know the validator crate exists.
//!
//! `validator`'s derive only ships `length`/`range`/`email`/`url`/`contains`/
//! `regex`/`must_match`/`required`/`nested` as built-in attributes. Spec.md
//! §4.B's `gt`/`gte`/`lt`/`lte`/`uuid`/`e164`/`jwt`/`base64`/`alpha`/
//! `alphanum`/`alphanumunicode`/`alphaunicode`/`numeric` rule kinds are
//! bridged in below as plain functions, wired up per-field with
//! `#[validate(custom(function = "..."))]`; the exclusive numeric bounds
//! take their threshold as a const generic so one function covers every
//! literal (`crate::validate::gt::<0>`).
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::FieldError;

/// `#[validate(custom(function = "crate::validate::gt::<N>"))]` — field must
/// be strictly greater than `N`.
pub fn gt<const N: i64>(value: &i64) -> Result<(), ValidationError> {
    if *value > N {
        Ok(())
    } else {
        Err(ValidationError::new("gt"))
    }
}

/// `#[validate(custom(function = "crate::validate::gte::<N>"))]`.
pub fn gte<const N: i64>(value: &i64) -> Result<(), ValidationError> {
    if *value >= N {
        Ok(())
    } else {
        Err(ValidationError::new("gte"))
    }
}

/// `#[validate(custom(function = "crate::validate::lt::<N>"))]`.
pub fn lt<const N: i64>(value: &i64) -> Result<(), ValidationError> {
    if *value < N {
        Ok(())
    } else {
        Err(ValidationError::new("lt"))
    }
}

/// `#[validate(custom(function = "crate::validate::lte::<N>"))]`.
pub fn lte<const N: i64>(value: &i64) -> Result<(), ValidationError> {
    if *value <= N {
        Ok(())
    } else {
        Err(ValidationError::new("lte"))
    }
}

/// `#[validate(custom(function = "crate::validate::uuid"))]`.
pub fn uuid(value: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

/// `#[validate(custom(function = "crate::validate::e164"))]` — `+` then 1
/// to 15 digits (ITU-T E.164).
pub fn e164(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('+').unwrap_or("");
    let valid = !digits.is_empty() && digits.len() <= 15 && digits.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("e164"))
    }
}

/// `#[validate(custom(function = "crate::validate::jwt"))]` — three
/// base64url segments, not a signature check.
pub fn jwt(value: &str) -> Result<(), ValidationError> {
    let parts: Vec<&str> = value.split('.').collect();
    let segment_ok = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if parts.len() == 3 && parts.iter().all(|p| segment_ok(p)) {
        Ok(())
    } else {
        Err(ValidationError::new("jwt"))
    }
}

/// `#[validate(custom(function = "crate::validate::base64"))]`.
pub fn base64(value: &str) -> Result<(), ValidationError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("base64"))
}

/// `#[validate(custom(function = "crate::validate::alpha"))]` — ASCII
/// letters only.
pub fn alpha(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("alpha"))
    }
}

/// `#[validate(custom(function = "crate::validate::alphanum"))]` — ASCII
/// letters and digits only.
pub fn alphanum(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanum"))
    }
}

/// `#[validate(custom(function = "crate::validate::alphaunicode"))]`.
pub fn alphaunicode(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphaunicode"))
    }
}

/// `#[validate(custom(function = "crate::validate::alphanumunicode"))]`.
pub fn alphanumunicode(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("alphanumunicode"))
    }
}

/// `#[validate(custom(function = "crate::validate::numeric"))]` — ASCII
/// digits only (string form; use `range` for numeric types).
pub fn numeric(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("numeric"))
    }
}

/// Run `T`'s declared constraints and flatten the result into an ordered
/// list of field errors. An empty list means validation passed.
pub fn validate<T: Validate>(value: &T) -> Vec<FieldError> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten(errors, ""),
    }
}

fn flatten(errors: ValidationErrors, prefix: &str) -> Vec<FieldError> {
    let mut out = Vec::new();
    for (field, kind) in errors.into_errors() {
        let qualified = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for e in field_errors {
                    let rule = e.code.to_string();
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&qualified, &rule));
                    let mut field_error = FieldError::new(&qualified, &message).with_rule(&rule);
                    if let Some(value) = e.params.get("value") {
                        field_error = field_error.with_value(value.clone());
                    }
                    out.push(field_error);
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                out.extend(flatten(*nested, &qualified));
            }
            ValidationErrorsKind::List(list) => {
                for (index, nested) in list {
                    out.extend(flatten(*nested, &format!("{}[{}]", qualified, index)));
                }
            }
        }
    }
    out
}

fn default_message(field: &str, rule: &str) -> String {
    match rule {
        "required" => format!("{} is required", field),
        "length" => format!("{} has an invalid length", field),
        "range" => format!("{} is out of range", field),
        "email" => format!("{} must be a valid email address", field),
        "url" => format!("{} must be a valid URL", field),
        "gt" => format!("{} must be greater than the allowed minimum", field),
        "gte" => format!("{} must be greater than or equal to the allowed minimum", field),
        "lt" => format!("{} must be less than the allowed maximum", field),
        "lte" => format!("{} must be less than or equal to the allowed maximum", field),
        "uuid" => format!("{} must be a valid UUID", field),
        "e164" => format!("{} must be a valid E.164 phone number", field),
        "jwt" => format!("{} must be a valid JWT", field),
        "base64" => format!("{} must be valid base64", field),
        "alpha" => format!("{} must contain only letters", field),
        "alphanum" => format!("{} must contain only letters and digits", field),
        "alphanumunicode" => format!("{} must contain only letters and digits", field),
        "alphaunicode" => format!("{} must contain only letters", field),
        "numeric" => format!("{} must contain only digits", field),
        _ => format!("{} failed constraint '{}'", field, rule),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Serialize;
    use validator::Validate;

    #[derive(Validate, Serialize)]
    struct Signup {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 0, max = 150))]
        age: u8,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let signup = Signup {
            name: "Alice".into(),
            age: 30,
            email: "alice@example.com".into(),
        };
        assert!(validate(&signup).is_empty());
    }

    #[test]
    fn test_invalid_record_names_the_field() {
        let signup = Signup {
            name: "".into(),
            age: 30,
            email: "not-an-email".into(),
        };
        let errors = validate(&signup);
        assert!(errors.iter().any(|e| e.field == "name" && e.message == "name is required"));
        assert!(errors.iter().any(|e| e.field == "email" && e.rule.as_deref() == Some("email")));
    }

    #[derive(Validate, Serialize)]
    struct BridgedRules {
        #[validate(custom(function = "crate::validate::gt::<0>"))]
        balance: i64,
        #[validate(custom(function = "crate::validate::uuid"))]
        tenant_id: String,
        #[validate(custom(function = "crate::validate::alphanum"))]
        username: String,
    }

    #[test]
    fn test_bridged_rule_kinds_pass_when_valid() {
        let record = BridgedRules {
            balance: 10,
            tenant_id: uuid::Uuid::new_v4().to_string(),
            username: "ada2024".to_string(),
        };
        assert!(validate(&record).is_empty());
    }

    #[test]
    fn test_bridged_rule_kinds_report_rule_code() {
        let record = BridgedRules {
            balance: -1,
            tenant_id: "not-a-uuid".to_string(),
            username: "ada lovelace!".to_string(),
        };
        let errors = validate(&record);
        assert!(errors.iter().any(|e| e.field == "balance" && e.rule.as_deref() == Some("gt")));
        assert!(errors.iter().any(|e| e.field == "tenant_id" && e.rule.as_deref() == Some("uuid")));
        assert!(errors.iter().any(|e| e.field == "username" && e.rule.as_deref() == Some("alphanum")));
    }

    #[test]
    fn test_e164_jwt_base64_alpha_numeric_helpers() {
        assert!(e164("+14155552671").is_ok());
        assert!(e164("14155552671").is_err());
        assert!(jwt("aaa.bbb.ccc").is_ok());
        assert!(jwt("not-a-jwt").is_err());
        assert!(base64("aGVsbG8=").is_ok());
        assert!(base64("not base64!!").is_err());
        assert!(alpha("Hello").is_ok());
        assert!(alpha("Hello1").is_err());
        assert!(numeric("12345").is_ok());
        assert!(numeric("123a5").is_err());
        assert!(alphaunicode("Café").is_ok());
        assert!(alphanumunicode("Café2024").is_ok());
    }
}
