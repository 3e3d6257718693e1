//! # Workflow Errors
//!
//! The error taxonomy surfaced to collaborators (HTTP layer, scheduler).
//! Only [`WorkflowError::Conflict`] is worth retrying; everything else
//! needs a different request.

use thiserror::Error;

use amt_core::{AssessmentId, ValidationError};
use amt_workflow::{AssessmentState, AssessmentType, Denial, IndependenceViolation};

use crate::ledger::LedgerError;

/// Errors returned by the workflow service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A referenced assessment, user, or module does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The caller is not permitted to perform the action.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// The target state is not a structural successor for this type.
    #[error("{assessment_type} assessment cannot move from {from} to {to}")]
    InvalidTransition {
        assessment_type: AssessmentType,
        from: AssessmentState,
        to: AssessmentState,
    },

    /// The assessment changed since the caller read it. Re-read and retry.
    #[error("{assessment_id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        assessment_id: AssessmentId,
        expected: u64,
        actual: u64,
    },

    /// A checker assignment failed the independence rule.
    #[error("checker independence violated: {0}")]
    IndependenceViolation(#[from] IndependenceViolation),

    /// The role is already held.
    #[error("user already holds {role} on this {scope}")]
    DuplicateRole { role: String, scope: &'static str },

    /// Malformed domain input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The user may not submit this review record now.
    #[error("not eligible: {0}")]
    Ineligible(String),

    /// The change would leave the system without an academic exams officer,
    /// or is a self-demotion.
    #[error("exams officer invariant: {0}")]
    ExamsOfficerInvariant(String),

    /// Another user already has this email.
    #[error("email {0} is already registered")]
    DuplicateEmail(String),
}

impl WorkflowError {
    pub(crate) fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Whether re-reading and resubmitting may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<Denial> for WorkflowError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::InvalidTransition {
                assessment_type,
                from,
                to,
            } => Self::InvalidTransition {
                assessment_type,
                from,
                to,
            },
            Denial::NotPermitted { .. } => Self::forbidden(denial.to_string()),
        }
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => Self::not_found("assessment", id),
            LedgerError::VersionConflict {
                assessment_id,
                expected,
                actual,
            } => Self::Conflict {
                assessment_id,
                expected,
                actual,
            },
        }
    }
}
