//! # Workflow Scenarios
//!
//! End-to-end lifecycles through [`WorkflowService`]: role setup, every
//! transition of the exam path, the review-record gates, overrides, and
//! the scheduled auto-progress job.

use std::sync::Arc;

use amt_core::{AssessmentId, FixedClock, ModuleId, Timestamp, UserId, ValidationError};
use amt_engine::{
    NewAssessment, NewUser, TransitionRequest, WorkflowError, WorkflowService, AUTO_PROGRESS_NOTE,
    SYSTEM_ACTOR,
};
use amt_workflow::{AssessmentRole, AssessmentState, AssessmentType, ModuleRole, UserBaseType};
use chrono::NaiveDate;

use AssessmentState::*;

struct Faculty {
    svc: WorkflowService,
    module: ModuleId,
    admin: UserId,
    officer: UserId,
    lead: UserId,
    moderator: UserId,
    setter: UserId,
    external: UserId,
}

fn person(svc: &WorkflowService, name: &str, base_type: UserBaseType) -> UserId {
    svc.create_user(NewUser {
        name: name.into(),
        email: format!("{}@example.ac.uk", name.to_lowercase()),
        base_type,
        exams_officer: false,
    })
    .unwrap()
    .id
}

fn faculty() -> Faculty {
    let clock = FixedClock::new(Timestamp::parse("2026-10-12T09:00:00Z").unwrap());
    let svc = WorkflowService::new(Arc::new(clock));
    let officer = svc.bootstrap_exams_officer("Olive", "olive@example.ac.uk").unwrap().id;
    let admin = person(&svc, "Tess", UserBaseType::TeachingSupport);
    let lead = person(&svc, "Lee", UserBaseType::Academic);
    let moderator = person(&svc, "Mo", UserBaseType::Academic);
    let setter = person(&svc, "Sue", UserBaseType::Academic);
    let external = person(&svc, "Ext", UserBaseType::ExternalExaminer);

    let module = svc.create_module("COM2004", "Data Driven Computing").unwrap().id;
    svc.assign_module_role(&module, &lead, ModuleRole::ModuleLead).unwrap();
    svc.assign_module_role(&module, &moderator, ModuleRole::Moderator).unwrap();
    svc.add_external_examiner(&module, &external).unwrap();

    Faculty {
        svc,
        module,
        admin,
        officer,
        lead,
        moderator,
        setter,
        external,
    }
}

impl Faculty {
    fn assessment(&self, assessment_type: AssessmentType, exam_date: Option<NaiveDate>) -> AssessmentId {
        let assessment = self
            .svc
            .create_assessment(
                &self.module,
                NewAssessment {
                    title: "Main paper".into(),
                    assessment_type,
                    exam_date,
                },
            )
            .unwrap();
        self.svc
            .assign_role(&assessment.id, &self.setter, AssessmentRole::Setter)
            .unwrap();
        assessment.id
    }

    fn step(&self, id: &AssessmentId, user: &UserId, target: AssessmentState) -> Result<AssessmentState, WorkflowError> {
        self.svc
            .progress(user, TransitionRequest::new(*id, target))
            .map(|a| a.state)
    }
}

fn exam_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2026, 10, 16)
}

#[test]
fn exam_requires_date_and_starts_in_draft() {
    let f = faculty();
    let err = f
        .svc
        .create_assessment(
            &f.module,
            NewAssessment {
                title: "Undated".into(),
                assessment_type: AssessmentType::Exam,
                exam_date: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(ValidationError::MissingExamDate)));

    let id = f.assessment(AssessmentType::Exam, exam_date());
    let exam = f.svc.get_assessment(&id).unwrap();
    assert_eq!(exam.state, Draft);
    assert_eq!(exam.version, 0);
    assert_eq!(f.svc.get_allowed_targets(&id, &f.setter).unwrap(), vec![ReadyForCheck]);
}

#[test]
fn module_moderator_is_auto_assigned_as_checker() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Coursework, None);
    let view = f.svc.get_assessment_view(&id, &f.moderator).unwrap();
    assert_eq!(view.roles, vec!["CHECKER".to_string()]);
}

#[test]
fn setter_drafts_but_only_checker_releases() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Coursework, None);

    assert_eq!(f.step(&id, &f.setter, ReadyForCheck).unwrap(), ReadyForCheck);
    assert!(matches!(
        f.step(&id, &f.setter, Released),
        Err(WorkflowError::Forbidden { .. })
    ));
    assert_eq!(f.step(&id, &f.moderator, Released).unwrap(), Released);
    assert_eq!(f.step(&id, &f.lead, DeadlinePassed).unwrap(), DeadlinePassed);
}

#[test]
fn checker_independence_rejects_staff_and_setters() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Test, None);

    let staff = person(&f.svc, "Stan", UserBaseType::Academic);
    f.svc.assign_module_role(&f.module, &staff, ModuleRole::Staff).unwrap();
    for candidate in [f.lead, staff, f.setter] {
        assert!(matches!(
            f.svc.assign_role(&id, &candidate, AssessmentRole::Checker),
            Err(WorkflowError::IndependenceViolation(_))
        ));
    }
    assert!(matches!(
        f.svc.assign_role(&id, &f.admin, AssessmentRole::Checker),
        Err(WorkflowError::IndependenceViolation(_))
    ));
    assert!(matches!(
        f.svc.assign_role(&id, &f.moderator, AssessmentRole::Checker),
        Err(WorkflowError::DuplicateRole { .. })
    ));
}

#[test]
fn external_feedback_is_at_most_once_and_only_from_assigned_examiner() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Exam, exam_date());
    f.step(&id, &f.setter, ReadyForCheck).unwrap();
    f.step(&id, &f.moderator, ExamOfficerCheck).unwrap();

    // Too early.
    assert!(matches!(
        f.svc.submit_external_feedback(&id, &f.external, "Looks fine"),
        Err(WorkflowError::Ineligible(_))
    ));
    f.step(&id, &f.officer, ExternalFeedback).unwrap();

    let stranger = person(&f.svc, "Other", UserBaseType::ExternalExaminer);
    for user in [stranger, f.setter, f.officer] {
        assert!(matches!(
            f.svc.submit_external_feedback(&id, &user, "Not mine to give"),
            Err(WorkflowError::Ineligible(_))
        ));
    }

    let record = f.svc.submit_external_feedback(&id, &f.external, "Question 3 is ambiguous").unwrap();
    assert_eq!(record.examiner, f.external);
    assert!(matches!(
        f.svc.submit_external_feedback(&id, &f.external, "One more thing"),
        Err(WorkflowError::Ineligible(_))
    ));
    assert_eq!(
        f.svc.external_feedback(&id).unwrap().feedback,
        "Question 3 is ambiguous"
    );
}

#[test]
fn full_exam_lifecycle() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Exam, exam_date());

    f.step(&id, &f.setter, ReadyForCheck).unwrap();
    f.step(&id, &f.moderator, ExamOfficerCheck).unwrap();
    f.step(&id, &f.officer, ExternalFeedback).unwrap();

    // Gated on the feedback record.
    assert!(matches!(
        f.step(&id, &f.setter, SetterResponse),
        Err(WorkflowError::Forbidden { .. })
    ));
    f.svc.submit_external_feedback(&id, &f.external, "Tighten Q2").unwrap();
    f.step(&id, &f.setter, SetterResponse).unwrap();

    // Gated on the setter response.
    assert!(matches!(
        f.step(&id, &f.setter, FinalCheck),
        Err(WorkflowError::Forbidden { .. })
    ));
    assert!(matches!(
        f.svc.submit_setter_response(&id, &f.moderator, "Not the setter", None),
        Err(WorkflowError::Ineligible(_))
    ));
    f.svc
        .submit_setter_response(&id, &f.setter, "Q2 reworded", Some("paper-v2.pdf".into()))
        .unwrap();
    f.step(&id, &f.setter, FinalCheck).unwrap();

    f.step(&id, &f.officer, SentToPrinting).unwrap();
    f.step(&id, &f.lead, ExamTaken).unwrap();
    // No rule covers EXAM_TAKEN → MARKING; teaching support carries it.
    f.step(&id, &f.admin, Marking).unwrap();
    f.step(&id, &f.setter, AdminMarkCheck).unwrap();
    f.step(&id, &f.officer, Moderated).unwrap();
    f.step(&id, &f.moderator, Approved).unwrap();
    assert!(matches!(
        f.step(&id, &f.officer, Published),
        Err(WorkflowError::Forbidden { .. })
    ));
    f.step(&id, &f.admin, Published).unwrap();

    let exam = f.svc.get_assessment(&id).unwrap();
    assert_eq!(exam.state, Published);
    assert_eq!(exam.version, 12);

    let log = f.svc.list_transitions(&id).unwrap();
    assert_eq!(log.len(), 12);
    assert_eq!(log[0].to_state, Published);
    assert_eq!(log[11].from_state, Draft);
    let overrides: Vec<_> = log.iter().filter(|t| t.is_override).map(|t| t.to_state).collect();
    assert_eq!(overrides, vec![Marking]);
    assert!(log.iter().all(|t| !t.is_reversion && t.reverted_transition.is_none()));

    // Terminal: nothing further is structural.
    assert!(matches!(
        f.step(&id, &f.setter, Draft),
        Err(WorkflowError::InvalidTransition { .. })
    ));
    assert!(f.svc.get_allowed_targets(&id, &f.admin).unwrap().is_empty());
}

#[test]
fn exams_officer_sends_back_for_changes() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Exam, exam_date());
    f.step(&id, &f.setter, ReadyForCheck).unwrap();
    f.step(&id, &f.moderator, ExamOfficerCheck).unwrap();

    assert_eq!(
        f.svc.get_allowed_targets(&id, &f.officer).unwrap(),
        vec![ExternalFeedback, ExamChangesRequired]
    );
    f.step(&id, &f.officer, ExamChangesRequired).unwrap();
    assert!(matches!(
        f.step(&id, &f.officer, ExamOfficerCheck),
        Err(WorkflowError::Forbidden { .. })
    ));
    f.step(&id, &f.setter, ExamOfficerCheck).unwrap();
}

#[test]
fn override_jumps_the_graph_and_is_flagged() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Coursework, None);
    let published = f
        .svc
        .override_transition(&f.admin, TransitionRequest::new(id, Published).with_note("migration"))
        .unwrap();
    assert_eq!(published.state, Published);

    let log = f.svc.list_transitions(&id).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].from_state, Draft);
    assert!(log[0].is_override);
    assert_eq!(log[0].by_user, Some(f.admin));
    assert_eq!(log[0].note.as_deref(), Some("migration"));
}

#[test]
fn stale_version_is_a_retryable_conflict() {
    let f = faculty();
    let id = f.assessment(AssessmentType::Test, None);
    f.svc
        .progress(&f.setter, TransitionRequest::new(id, ReadyForCheck).at_version(0))
        .unwrap();
    let err = f
        .svc
        .progress(&f.moderator, TransitionRequest::new(id, TestTaken).at_version(0))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Conflict { expected: 0, actual: 1, .. }));
    assert!(err.is_retryable());
    assert_eq!(f.svc.list_transitions(&id).unwrap().len(), 1);
}

#[test]
fn scheduler_moves_printed_exams_after_exam_day() {
    let f = faculty();
    let due = f.assessment(AssessmentType::Exam, exam_date());
    let later = f.assessment(AssessmentType::Exam, NaiveDate::from_ymd_opt(2026, 10, 30));
    for id in [due, later] {
        f.svc
            .override_transition(&f.admin, TransitionRequest::new(id, SentToPrinting))
            .unwrap();
    }

    // Monday 2026-10-19: the last working day is Friday the 16th.
    let summary = f.svc.auto_progress_exams(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    assert_eq!(summary.progressed, vec![due]);
    assert!(summary.skipped.is_empty());

    assert_eq!(f.svc.get_assessment(&due).unwrap().state, ExamTaken);
    assert_eq!(f.svc.get_assessment(&later).unwrap().state, SentToPrinting);

    let last = &f.svc.list_transitions(&due).unwrap()[0];
    assert_eq!(last.by_user, None);
    assert_eq!(last.by_display_name, SYSTEM_ACTOR);
    assert_eq!(last.note.as_deref(), Some(AUTO_PROGRESS_NOTE));
    assert!(!last.is_override);
}

#[test]
fn last_exams_officer_cannot_be_removed() {
    let f = faculty();
    assert!(matches!(
        f.svc.set_exams_officer(&f.officer, &f.admin, false),
        Err(WorkflowError::ExamsOfficerInvariant(_))
    ));

    f.svc.set_exams_officer(&f.lead, &f.admin, true).unwrap();
    f.svc.set_exams_officer(&f.officer, &f.admin, false).unwrap();
    f.svc.ensure_exams_officer_invariant().unwrap();
    assert!(matches!(
        f.svc.set_exams_officer(&f.lead, &f.admin, false),
        Err(WorkflowError::ExamsOfficerInvariant(_))
    ));
}
