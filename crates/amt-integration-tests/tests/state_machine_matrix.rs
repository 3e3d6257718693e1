//! # State Machine Transition Matrix
//!
//! Exhaustive 20x20 matrix per assessment type. Every pair not listed as
//! an expected edge must be rejected by the policy table.

use amt_core::{ModuleId, Timestamp, UserId};
use amt_engine::{ExternalFeedback, ReviewStore, RoleRegistry, SetterResponse};
use amt_workflow::policy::states_for;
use amt_workflow::{
    is_valid_transition, possible_next_states, Assessment, AssessmentRole, AssessmentState,
    AssessmentType, Authority, ModuleRole, User, UserBaseType,
};
use chrono::NaiveDate;
use proptest::prelude::*;

use AssessmentState::*;

fn assert_matrix(assessment_type: AssessmentType, expected_valid: &[(AssessmentState, AssessmentState)]) {
    for from in AssessmentState::ALL {
        for to in AssessmentState::ALL {
            let actual = is_valid_transition(assessment_type, from, to);
            let expected = expected_valid.contains(&(from, to));
            assert_eq!(
                actual, expected,
                "{assessment_type} transition {from} → {to}: expected valid={expected}, got valid={actual}"
            );
        }
    }
}

// =========================================================================
// CW: 11 edges
// =========================================================================

#[test]
fn coursework_transition_matrix_exhaustive() {
    assert_matrix(
        AssessmentType::Coursework,
        &[
            (Draft, ReadyForCheck),
            (ReadyForCheck, ChangesRequired),
            (ReadyForCheck, Released),
            (ReadyForCheck, Draft),
            (ChangesRequired, ReadyForCheck),
            (Released, DeadlinePassed),
            (DeadlinePassed, Marking),
            (Marking, Moderated),
            (Moderated, FeedbackReturned),
            (FeedbackReturned, Approved),
            (Approved, Published),
        ],
    );
}

// =========================================================================
// TEST: 10 edges
// =========================================================================

#[test]
fn test_transition_matrix_exhaustive() {
    assert_matrix(
        AssessmentType::Test,
        &[
            (Draft, ReadyForCheck),
            (ReadyForCheck, ChangesRequired),
            (ReadyForCheck, TestTaken),
            (ReadyForCheck, Draft),
            (ChangesRequired, ReadyForCheck),
            (TestTaken, Marking),
            (Marking, Moderated),
            (Moderated, ResultsReturned),
            (ResultsReturned, Approved),
            (Approved, Published),
        ],
    );
}

// =========================================================================
// EXAM: 18 edges
// =========================================================================

#[test]
fn exam_transition_matrix_exhaustive() {
    assert_matrix(
        AssessmentType::Exam,
        &[
            (Draft, ReadyForCheck),
            (ReadyForCheck, ChangesRequired),
            (ReadyForCheck, ExamOfficerCheck),
            (ReadyForCheck, Draft),
            (ChangesRequired, ReadyForCheck),
            (ExamOfficerCheck, ExternalFeedback),
            (ExamOfficerCheck, ExamChangesRequired),
            (ExamChangesRequired, ExamOfficerCheck),
            (ExternalFeedback, SetterResponse),
            (SetterResponse, FinalCheck),
            (FinalCheck, SentToPrinting),
            (FinalCheck, ExamChangesRequired),
            (SentToPrinting, ExamTaken),
            (ExamTaken, Marking),
            (Marking, AdminMarkCheck),
            (AdminMarkCheck, Moderated),
            (Moderated, Approved),
            (Approved, Published),
        ],
    );
}

#[test]
fn published_is_terminal_for_every_type() {
    for ty in AssessmentType::ALL {
        assert!(possible_next_states(ty, Published).is_empty(), "{ty}");
    }
    assert!(Published.is_terminal());
    assert!(!Approved.is_terminal());
}

#[test]
fn off_path_states_have_no_successors() {
    for ty in AssessmentType::ALL {
        let on_path = states_for(ty);
        for state in AssessmentState::ALL {
            if !on_path.contains(&state) {
                assert!(
                    possible_next_states(ty, state).is_empty(),
                    "{state} is not on the {ty} path but has successors"
                );
            }
        }
    }
}

#[test]
fn state_names_round_trip() {
    for state in AssessmentState::ALL {
        assert_eq!(AssessmentState::from_name(state.as_str()), Some(state));
    }
    for ty in AssessmentType::ALL {
        assert_eq!(AssessmentType::from_name(ty.as_str()), Some(ty));
    }
}

// =========================================================================
// Authorization never widens the structural graph
// =========================================================================

#[derive(Debug, Clone)]
struct Situation {
    assessment_type: AssessmentType,
    state: AssessmentState,
    base_type: UserBaseType,
    exams_officer: bool,
    assessment_roles: Vec<AssessmentRole>,
    module_roles: Vec<ModuleRole>,
    feedback: bool,
    response: bool,
}

fn situation() -> impl Strategy<Value = Situation> {
    (
        prop::sample::select(AssessmentType::ALL.to_vec()),
        prop::sample::select(AssessmentState::ALL.to_vec()),
        prop::sample::select(vec![
            UserBaseType::Academic,
            UserBaseType::TeachingSupport,
            UserBaseType::ExternalExaminer,
        ]),
        any::<bool>(),
        prop::sample::subsequence(vec![AssessmentRole::Setter, AssessmentRole::Checker], 0..=2),
        prop::sample::subsequence(
            vec![ModuleRole::ModuleLead, ModuleRole::Moderator, ModuleRole::Staff],
            0..=3,
        ),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(assessment_type, state, base_type, exams_officer, assessment_roles, module_roles, feedback, response)| {
                Situation {
                    assessment_type,
                    state,
                    base_type,
                    exams_officer,
                    assessment_roles,
                    module_roles,
                    feedback,
                    response,
                }
            },
        )
}

fn materialize(s: &Situation) -> (RoleRegistry, ReviewStore, User, Assessment) {
    let now = Timestamp::now();
    let mut assessment = Assessment::new(
        ModuleId::new(),
        "Generated",
        s.assessment_type,
        NaiveDate::from_ymd_opt(2026, 12, 1),
        now,
    )
    .unwrap();
    assessment.state = s.state;

    let user = User {
        id: UserId::new(),
        name: "Generated".into(),
        email: "generated@example.ac.uk".into(),
        base_type: s.base_type,
        exams_officer: s.exams_officer,
    };

    let roles = RoleRegistry::new();
    for role in &s.assessment_roles {
        roles.assign_assessment_role(assessment.id, user.id, *role).unwrap();
    }
    for role in &s.module_roles {
        roles.assign_module_role(assessment.module_id, user.id, *role).unwrap();
    }

    let reviews = ReviewStore::new();
    if s.feedback {
        reviews.record_feedback(ExternalFeedback {
            assessment_id: assessment.id,
            examiner: UserId::new(),
            feedback: "Fine".into(),
            submitted_at: now,
        });
    }
    if s.response {
        reviews.record_response(SetterResponse {
            assessment_id: assessment.id,
            setter: user.id,
            response: "Done".into(),
            document_ref: None,
            submitted_at: now,
        });
    }
    (roles, reviews, user, assessment)
}

proptest! {
    #[test]
    fn allowed_targets_are_structural(s in situation()) {
        let (roles, reviews, user, assessment) = materialize(&s);
        let authority = Authority::new(&roles, &reviews);
        let structural = possible_next_states(assessment.assessment_type, assessment.state);
        let allowed = authority.allowed_targets(&user, &assessment);

        for target in &allowed {
            prop_assert!(structural.contains(target));
        }
        if user.is_admin() {
            prop_assert_eq!(allowed.as_slice(), structural);
        }
    }

    #[test]
    fn non_admins_never_pass_off_graph_targets(s in situation(), target in prop::sample::select(AssessmentState::ALL.to_vec())) {
        prop_assume!(s.base_type != UserBaseType::TeachingSupport);
        let (roles, reviews, user, assessment) = materialize(&s);
        let authority = Authority::new(&roles, &reviews);
        if !is_valid_transition(assessment.assessment_type, assessment.state, target) {
            prop_assert!(!authority.may_transition(&user, &assessment, target));
        }
    }
}
