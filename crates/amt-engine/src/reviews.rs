//! Exam review records: external examiner feedback and the setter's
//! response. At most one of each per assessment.

use amt_core::AssessmentId;
use amt_workflow::ReviewRecords;

use crate::records::{ExternalFeedback, SetterResponse};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
pub struct ReviewStore {
    feedback: Store<AssessmentId, ExternalFeedback>,
    responses: Store<AssessmentId, SetterResponse>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record feedback. Returns `false` if feedback already exists.
    pub fn record_feedback(&self, feedback: ExternalFeedback) -> bool {
        self.feedback.insert_new(feedback.assessment_id, feedback).is_ok()
    }

    /// Record a setter response. Returns `false` if one already exists.
    pub fn record_response(&self, response: SetterResponse) -> bool {
        self.responses
            .insert_new(response.assessment_id, response)
            .is_ok()
    }

    pub fn feedback(&self, assessment: &AssessmentId) -> Option<ExternalFeedback> {
        self.feedback.get(assessment)
    }

    pub fn response(&self, assessment: &AssessmentId) -> Option<SetterResponse> {
        self.responses.get(assessment)
    }
}

impl ReviewRecords for ReviewStore {
    fn has_external_feedback(&self, assessment: &AssessmentId) -> bool {
        self.feedback.contains(assessment)
    }

    fn has_setter_response(&self, assessment: &AssessmentId) -> bool {
        self.responses.contains(assessment)
    }
}
