//! # Validation Errors
//!
//! Raised when domain input is malformed before any workflow rule is
//! consulted. Workflow and authorization failures live in the crates that
//! own those rules.

use thiserror::Error;

/// A domain value failed validation at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{field} must not be empty")]
    Blank {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },

    /// Exams must carry an exam date.
    #[error("exam date required for exams")]
    MissingExamDate,

    /// Only academics may hold the exams-officer flag.
    #[error("only academics can be exams officers")]
    ExamsOfficerNotAcademic,

    /// Only external examiners may be attached to a module as such.
    #[error("user is not an external examiner")]
    NotExternalExaminer,

    /// A value could not be parsed into its domain type.
    #[error("invalid {kind}: {value:?}")]
    Unrecognized {
        /// The domain type that was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Trim `value` and reject it if blank or longer than `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("title", "  Exam  ", 10).unwrap(), "Exam");
    }

    #[test]
    fn require_text_rejects_blank() {
        assert_eq!(
            require_text("title", "   ", 10),
            Err(ValidationError::Blank { field: "title" })
        );
    }

    #[test]
    fn require_text_rejects_overlong() {
        let err = require_text("code", "COM12345678", 8).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { field: "code", max: 8 });
        assert_eq!(err.to_string(), "code must not exceed 8 characters");
    }
}
