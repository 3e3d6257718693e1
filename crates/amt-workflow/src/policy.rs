//! # Transition Policy Engine
//!
//! The structural state graph for each assessment type, held as a single
//! lookup table keyed by `(type, state)`. The table answers only "which
//! states can follow this one for this type"; it knows nothing about who
//! is asking. Authorization is layered on top in [`crate::authority`].
//!
//! ## Graphs
//!
//! ```text
//! common:  DRAFT ⇄ READY_FOR_CHECK ⇄ CHANGES_REQUIRED
//!
//! CW:      READY_FOR_CHECK → RELEASED → DEADLINE_PASSED → MARKING → MODERATED
//!          → FEEDBACK_RETURNED → APPROVED → PUBLISHED
//!
//! TEST:    READY_FOR_CHECK → TEST_TAKEN → MARKING → MODERATED
//!          → RESULTS_RETURNED → APPROVED → PUBLISHED
//!
//! EXAM:    READY_FOR_CHECK → EXAM_OFFICER_CHECK ⇄ EXAM_CHANGES_REQUIRED
//!          EXAM_OFFICER_CHECK → EXTERNAL_FEEDBACK → SETTER_RESPONSE → FINAL_CHECK
//!          FINAL_CHECK → EXAM_CHANGES_REQUIRED | SENT_TO_PRINTING → EXAM_TAKEN
//!          → MARKING → ADMIN_MARK_CHECK → MODERATED → APPROVED → PUBLISHED
//! ```
//!
//! The order of targets within a row is the enumeration order exposed to
//! callers of `allowed_targets`, and is stable.

use crate::state::{AssessmentState, AssessmentType};

use AssessmentState::*;
use AssessmentType::*;

/// One row of the transition table.
pub type PolicyRow = (AssessmentType, AssessmentState, &'static [AssessmentState]);

/// The complete structural state graph. States absent for a type have no
/// outgoing edges for that type.
pub const TRANSITION_TABLE: &[PolicyRow] = &[
    // Coursework
    (Coursework, Draft, &[ReadyForCheck]),
    (Coursework, ReadyForCheck, &[ChangesRequired, Released, Draft]),
    (Coursework, ChangesRequired, &[ReadyForCheck]),
    (Coursework, Released, &[DeadlinePassed]),
    (Coursework, DeadlinePassed, &[Marking]),
    (Coursework, Marking, &[Moderated]),
    (Coursework, Moderated, &[FeedbackReturned]),
    (Coursework, FeedbackReturned, &[Approved]),
    (Coursework, Approved, &[Published]),
    // Test
    (Test, Draft, &[ReadyForCheck]),
    (Test, ReadyForCheck, &[ChangesRequired, TestTaken, Draft]),
    (Test, ChangesRequired, &[ReadyForCheck]),
    (Test, TestTaken, &[Marking]),
    (Test, Marking, &[Moderated]),
    (Test, Moderated, &[ResultsReturned]),
    (Test, ResultsReturned, &[Approved]),
    (Test, Approved, &[Published]),
    // Exam
    (Exam, Draft, &[ReadyForCheck]),
    (Exam, ReadyForCheck, &[ChangesRequired, ExamOfficerCheck, Draft]),
    (Exam, ChangesRequired, &[ReadyForCheck]),
    (Exam, ExamOfficerCheck, &[ExternalFeedback, ExamChangesRequired]),
    (Exam, ExamChangesRequired, &[ExamOfficerCheck]),
    (Exam, ExternalFeedback, &[SetterResponse]),
    (Exam, SetterResponse, &[FinalCheck]),
    (Exam, FinalCheck, &[SentToPrinting, ExamChangesRequired]),
    (Exam, SentToPrinting, &[ExamTaken]),
    (Exam, ExamTaken, &[Marking]),
    (Exam, Marking, &[AdminMarkCheck]),
    (Exam, AdminMarkCheck, &[Moderated]),
    (Exam, Moderated, &[Approved]),
    (Exam, Approved, &[Published]),
];

/// The structurally valid next states for an assessment of type
/// `assessment_type` currently in `current`.
///
/// Empty for `PUBLISHED` and for any state not on the type's path.
pub fn possible_next_states(
    assessment_type: AssessmentType,
    current: AssessmentState,
) -> &'static [AssessmentState] {
    TRANSITION_TABLE
        .iter()
        .find(|(ty, from, _)| *ty == assessment_type && *from == current)
        .map(|(_, _, targets)| *targets)
        .unwrap_or(&[])
}

/// Whether `from → to` is an edge of the type's graph.
pub fn is_valid_transition(
    assessment_type: AssessmentType,
    from: AssessmentState,
    to: AssessmentState,
) -> bool {
    possible_next_states(assessment_type, from).contains(&to)
}

/// Every `(from, to)` edge for one assessment type, in table order.
pub fn edges(assessment_type: AssessmentType) -> impl Iterator<Item = (AssessmentState, AssessmentState)> {
    TRANSITION_TABLE
        .iter()
        .filter(move |(ty, _, _)| *ty == assessment_type)
        .flat_map(|(_, from, targets)| targets.iter().map(move |to| (*from, *to)))
}

/// States that appear anywhere on a type's path.
pub fn states_for(assessment_type: AssessmentType) -> Vec<AssessmentState> {
    AssessmentState::ALL
        .iter()
        .copied()
        .filter(|s| edges(assessment_type).any(|(from, to)| from == *s || to == *s))
        .collect()
}
