//! # Assessment Record
//!
//! The assessment owns its current state exclusively; only the transition
//! executor writes it, and every write bumps `version` so concurrent
//! writers can detect each other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use amt_core::error::require_text;
use amt_core::{AssessmentId, ModuleId, Timestamp, ValidationError};

use crate::state::{AssessmentState, AssessmentType};

/// Maximum length of an assessment title.
pub const MAX_TITLE_LEN: usize = 255;

/// An assessment belonging to exactly one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub module_id: ModuleId,
    pub title: String,
    /// Immutable after creation.
    pub assessment_type: AssessmentType,
    pub state: AssessmentState,
    /// Mandatory for exams.
    pub exam_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    /// Optimistic concurrency counter. Starts at 0, +1 per committed transition.
    pub version: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Assessment {
    /// Create a new assessment in `DRAFT` at version 0.
    ///
    /// Rejects a blank title and an exam without an exam date.
    pub fn new(
        module_id: ModuleId,
        title: &str,
        assessment_type: AssessmentType,
        exam_date: Option<NaiveDate>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let title = require_text("title", title, MAX_TITLE_LEN)?;
        if assessment_type == AssessmentType::Exam && exam_date.is_none() {
            return Err(ValidationError::MissingExamDate);
        }
        Ok(Self {
            id: AssessmentId::new(),
            module_id,
            title,
            assessment_type,
            state: AssessmentState::Draft,
            exam_date,
            description: None,
            file_name: None,
            file_url: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }
}
