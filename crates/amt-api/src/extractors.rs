//! Request body handling for the workflow API.
//!
//! Handlers take their body as `Result<Json<T>, JsonRejection>` and hand it
//! to [`extract_json`] or [`extract_validated_json`], so malformed JSON and
//! over-long notes or feedback both come back in the standard error envelope.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Field rules a request body must satisfy once it has parsed, such as a
/// non-empty module title or a transition note within its length limit.
pub trait Validate {
    /// `Err` carries the message returned to the caller.
    fn validate(&self) -> Result<(), String>;
}

/// Unwraps a parsed body. A rejection (bad JSON, wrong content type) becomes
/// a 400 carrying axum's own description of what went wrong.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// [`extract_json`] followed by the body's [`Validate`] rules; a rule
/// failure is a 422.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Shared check for free-text fields with an upper bound.
pub(crate) fn check_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{field} must not exceed {max} characters"))
    } else {
        Ok(())
    }
}

/// Shared check for required free-text fields.
pub(crate) fn check_present(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note(String);

    impl Validate for Note {
        fn validate(&self) -> Result<(), String> {
            check_present("note", &self.0)?;
            check_len("note", &self.0, 5)
        }
    }

    #[test]
    fn parsed_body_passes_through_its_rules() {
        let note = extract_validated_json(Ok(Json(Note("ok".into())))).unwrap();
        assert_eq!(note.0, "ok");
    }

    #[test]
    fn rule_failures_are_validation_errors() {
        match extract_validated_json(Ok(Json(Note("   ".into())))) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "note must not be empty"),
            _ => panic!("blank note accepted"),
        }
        match extract_validated_json(Ok(Json(Note("toolong".into())))) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "note must not exceed 5 characters"),
            _ => panic!("long note accepted"),
        }
    }
}
