//! Records owned by the engine around the assessment lifecycle.

use serde::{Deserialize, Serialize};

use amt_core::{AssessmentId, ModuleId, Timestamp, UserId};

/// A teaching module. Assessments belong to exactly one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    /// Short code, e.g. `COM1001`.
    pub code: String,
    pub title: String,
    pub created_at: Timestamp,
}

/// Feedback from the module's external examiner on an exam paper.
/// At most one per assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFeedback {
    pub assessment_id: AssessmentId,
    pub examiner: UserId,
    pub feedback: String,
    pub submitted_at: Timestamp,
}

/// The setter's reply to external feedback. At most one per assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetterResponse {
    pub assessment_id: AssessmentId,
    pub setter: UserId,
    pub response: String,
    /// Optional reference to a revised paper.
    pub document_ref: Option<String>,
    pub submitted_at: Timestamp,
}
