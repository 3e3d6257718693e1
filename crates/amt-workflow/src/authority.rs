//! # Authorization Matrix
//!
//! Decides whether a user may move an assessment to a target state, and
//! answers the related eligibility questions (checker independence,
//! external feedback, setter response).
//!
//! ## Evaluation order
//!
//! 1. Admin-class users (teaching support) are always permitted.
//! 2. Otherwise the target must be a structural successor of the current
//!    state for the assessment's type ([`crate::policy`]).
//! 3. Roles are resolved from the [`RoleDirectory`] for this check.
//! 4. The rule table is applied in order; the first rule that matches the
//!    `(from, to)` pair decides. Nothing matching means deny.
//!
//! | from → to                                                   | permitted if |
//! |-------------------------------------------------------------|--------------|
//! | DRAFT → READY_FOR_CHECK                                     | setter |
//! | CHANGES_REQUIRED → READY_FOR_CHECK                          | setter |
//! | EXAM_CHANGES_REQUIRED → EXAM_OFFICER_CHECK                  | setter |
//! | READY_FOR_CHECK → DRAFT                                     | setter |
//! | READY_FOR_CHECK → CHANGES_REQUIRED / RELEASED / TEST_TAKEN / EXAM_OFFICER_CHECK | checker |
//! | * → DEADLINE_PASSED / TEST_TAKEN / EXAM_TAKEN               | module lead (grant only) |
//! | EXAM_OFFICER_CHECK → EXTERNAL_FEEDBACK / EXAM_CHANGES_REQUIRED | exams officer, exam |
//! | FINAL_CHECK → SENT_TO_PRINTING / EXAM_CHANGES_REQUIRED      | exams officer, exam |
//! | SENT_TO_PRINTING → *, ADMIN_MARK_CHECK → *                  | exams officer, exam (grant only) |
//! | EXTERNAL_FEEDBACK → SETTER_RESPONSE                         | external feedback exists |
//! | SETTER_RESPONSE → FINAL_CHECK                               | setter and response exists |
//! | MARKING → *                                                 | setter, checker, or any module role |
//! | MODERATED → *                                               | moderator |
//! | FEEDBACK_RETURNED → *, RESULTS_RETURNED → *                 | module lead |
//! | APPROVED → PUBLISHED                                        | teaching support |
//!
//! "Grant only" rows permit when their role holds and otherwise fall
//! through to later rows, so a module lead who is not an exams officer
//! cannot block an exams officer from recording `SENT_TO_PRINTING →
//! EXAM_TAKEN`.

use thiserror::Error;

use crate::assessment::Assessment;
use crate::directory::{ReviewRecords, RoleDirectory};
use crate::policy::{is_valid_transition, possible_next_states};
use crate::roles::{AssessmentRole, ModuleRole, ResolvedRoles, User, UserBaseType};
use crate::state::{AssessmentState, AssessmentType};

use AssessmentState::*;

/// Why a transition was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// A rule in the table permits the transition.
    Rule,
    /// Only the admin-class override authority permits it: the edge is not
    /// structural, or no rule grants it to this user.
    AdminAuthority,
}

/// Why a transition was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The target is not a structural successor for this type.
    #[error("{assessment_type} assessment cannot move from {from} to {to}")]
    InvalidTransition {
        assessment_type: AssessmentType,
        from: AssessmentState,
        to: AssessmentState,
    },

    /// The edge exists but no rule grants it to this user.
    #[error("not permitted to move from {from} to {to}")]
    NotPermitted {
        from: AssessmentState,
        to: AssessmentState,
    },
}

/// Why a user cannot be assigned as checker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndependenceViolation {
    /// Checkers must be academics.
    #[error("checker must be an academic, user is {0}")]
    NotAcademic(UserBaseType),

    /// Module leads and module staff are not independent of the module.
    #[error("user holds {0} on the assessment's module")]
    ModuleStaff(ModuleRole),

    /// The setter cannot check their own assessment.
    #[error("user is a setter on this assessment")]
    Setter,
}

/// Authorization over a role directory and the exam review records.
///
/// Stateless apart from the borrowed lookups; every method performs its
/// own role resolution and is safe to call concurrently.
pub struct Authority<'a> {
    roles: &'a dyn RoleDirectory,
    records: &'a dyn ReviewRecords,
}

impl<'a> Authority<'a> {
    pub fn new(roles: &'a dyn RoleDirectory, records: &'a dyn ReviewRecords) -> Self {
        Self { roles, records }
    }

    /// Decide whether `user` may move `assessment` to `target`.
    pub fn authorize(
        &self,
        user: &User,
        assessment: &Assessment,
        target: AssessmentState,
    ) -> Result<Grant, Denial> {
        let from = assessment.state;
        let structural = is_valid_transition(assessment.assessment_type, from, target);

        if user.is_admin() {
            if structural && self.rule_permits(user, assessment, target) {
                return Ok(Grant::Rule);
            }
            return Ok(Grant::AdminAuthority);
        }

        if !structural {
            return Err(Denial::InvalidTransition {
                assessment_type: assessment.assessment_type,
                from,
                to: target,
            });
        }

        if self.rule_permits(user, assessment, target) {
            Ok(Grant::Rule)
        } else {
            Err(Denial::NotPermitted { from, to: target })
        }
    }

    /// Boolean form of [`Authority::authorize`].
    pub fn may_transition(&self, user: &User, assessment: &Assessment, target: AssessmentState) -> bool {
        self.authorize(user, assessment, target).is_ok()
    }

    /// Structural successors of the current state that `user` may choose,
    /// in policy-table order.
    pub fn allowed_targets(&self, user: &User, assessment: &Assessment) -> Vec<AssessmentState> {
        possible_next_states(assessment.assessment_type, assessment.state)
            .iter()
            .copied()
            .filter(|target| self.may_transition(user, assessment, *target))
            .collect()
    }

    /// Checker independence: academic, no lead/staff role on the module,
    /// not a setter on the assessment. Applied when assigning the role.
    pub fn check_checker_independence(
        &self,
        user: &User,
        assessment: &Assessment,
    ) -> Result<(), IndependenceViolation> {
        if user.base_type != UserBaseType::Academic {
            return Err(IndependenceViolation::NotAcademic(user.base_type));
        }
        if let Some(role) = self
            .roles
            .module_roles(&assessment.module_id, &user.id)
            .into_iter()
            .find(|r| matches!(r, ModuleRole::ModuleLead | ModuleRole::Staff))
        {
            return Err(IndependenceViolation::ModuleStaff(role));
        }
        if self
            .roles
            .assessment_roles(&assessment.id, &user.id)
            .contains(&AssessmentRole::Setter)
        {
            return Err(IndependenceViolation::Setter);
        }
        Ok(())
    }

    pub fn can_be_checker(&self, user: &User, assessment: &Assessment) -> bool {
        self.check_checker_independence(user, assessment).is_ok()
    }

    /// External examiner assigned to the module, exam in `EXTERNAL_FEEDBACK`,
    /// and no feedback recorded yet.
    pub fn can_submit_external_feedback(&self, user: &User, assessment: &Assessment) -> bool {
        user.is_external_examiner()
            && self
                .roles
                .is_external_examiner_for(&assessment.module_id, &user.id)
            && assessment.assessment_type == AssessmentType::Exam
            && assessment.state == ExternalFeedback
            && !self.records.has_external_feedback(&assessment.id)
    }

    /// Setter on an exam in `SETTER_RESPONSE` with feedback present and no
    /// response recorded yet.
    pub fn can_submit_setter_response(&self, user: &User, assessment: &Assessment) -> bool {
        self.roles
            .assessment_roles(&assessment.id, &user.id)
            .contains(&AssessmentRole::Setter)
            && assessment.assessment_type == AssessmentType::Exam
            && assessment.state == SetterResponse
            && self.records.has_external_feedback(&assessment.id)
            && !self.records.has_setter_response(&assessment.id)
    }

    fn resolve(&self, user: &User, assessment: &Assessment) -> ResolvedRoles {
        self.roles
            .resolve(&assessment.id, &assessment.module_id, &user.id)
    }

    /// The rule table. Assumes the edge is structural.
    fn rule_permits(&self, user: &User, assessment: &Assessment, to: AssessmentState) -> bool {
        let from = assessment.state;
        let roles = self.resolve(user, assessment);

        // Setter and checker rows decide outright.
        match (from, to) {
            (Draft, ReadyForCheck)
            | (ChangesRequired, ReadyForCheck)
            | (ExamChangesRequired, ExamOfficerCheck)
            | (ReadyForCheck, Draft) => return roles.is_setter(),
            (ReadyForCheck, ChangesRequired | Released | TestTaken | ExamOfficerCheck) => {
                return roles.is_checker()
            }
            _ => {}
        }

        if roles.is_module_lead() && matches!(to, DeadlinePassed | TestTaken | ExamTaken) {
            return true;
        }

        if user.is_exams_officer() && assessment.assessment_type == AssessmentType::Exam {
            match from {
                ExamOfficerCheck => return matches!(to, ExternalFeedback | ExamChangesRequired),
                FinalCheck => return matches!(to, SentToPrinting | ExamChangesRequired),
                SentToPrinting | AdminMarkCheck => return true,
                _ => {}
            }
        }

        match (from, to) {
            (ExternalFeedback, SetterResponse) => self.records.has_external_feedback(&assessment.id),
            (SetterResponse, FinalCheck) => {
                roles.is_setter() && self.records.has_setter_response(&assessment.id)
            }
            (Marking, _) => roles.is_setter() || roles.is_checker() || roles.is_module_staff(),
            (Moderated, _) => roles.is_moderator(),
            (FeedbackReturned | ResultsReturned, _) => roles.is_module_lead(),
            (Approved, Published) => user.base_type == UserBaseType::TeachingSupport,
            _ => false,
        }
    }
}
