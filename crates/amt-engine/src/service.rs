//! # Workflow Service
//!
//! The facade the HTTP layer and the scheduler talk to. Resolves users,
//! modules and assessments by ID, applies the assignment-time rules
//! (checker independence, role uniqueness, review eligibility), and routes
//! every state change through the [`TransitionExecutor`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use amt_core::error::require_text;
use amt_core::{AssessmentId, Clock, ModuleId, SystemClock, UserId, ValidationError};
use amt_workflow::{
    Assessment, AssessmentRole, AssessmentState, AssessmentType, Authority, ModuleRole,
    RoleDirectory, Transition, User, UserBaseType,
};

use crate::directory::RoleRegistry;
use crate::error::WorkflowError;
use crate::executor::{TransitionExecutor, TransitionRequest};
use crate::ledger::AssessmentLedger;
use crate::records::{ExternalFeedback, Module, SetterResponse};
use crate::reviews::ReviewStore;
use crate::scheduler::{self, AutoProgressSummary};
use crate::store::Store;
use crate::users::{NewUser, UserRegistry};

const MAX_MODULE_CODE_LEN: usize = 32;
const MAX_MODULE_TITLE_LEN: usize = 255;
const MAX_REVIEW_LEN: usize = 10_000;

/// Input for [`WorkflowService::create_assessment`].
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub title: String,
    pub assessment_type: AssessmentType,
    pub exam_date: Option<NaiveDate>,
}

/// Content a setter attaches to a draft.
#[derive(Debug, Clone, Default)]
pub struct ContentSubmission {
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
}

/// An assessment as seen by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentView {
    #[serde(flatten)]
    pub assessment: Assessment,
    /// The user's assessment role names, or `ADMIN` for teaching support
    /// users holding none.
    pub roles: Vec<String>,
    pub allowed_targets: Vec<AssessmentState>,
}

/// A user holding a role on an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleHolder {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub base_type: UserBaseType,
    pub role: AssessmentRole,
}

#[derive(Clone)]
pub struct WorkflowService {
    users: UserRegistry,
    modules: Store<ModuleId, Module>,
    roles: RoleRegistry,
    reviews: ReviewStore,
    ledger: AssessmentLedger,
    executor: TransitionExecutor,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for WorkflowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowService")
            .field("modules", &self.modules.len())
            .field("assessments", &self.ledger.list().len())
            .finish_non_exhaustive()
    }
}

impl Default for WorkflowService {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl WorkflowService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let ledger = AssessmentLedger::new();
        let roles = RoleRegistry::new();
        let reviews = ReviewStore::new();
        let executor = TransitionExecutor::new(
            ledger.clone(),
            roles.clone(),
            reviews.clone(),
            Arc::clone(&clock),
        );
        Self {
            users: UserRegistry::new(),
            modules: Store::new(),
            roles,
            reviews,
            ledger,
            executor,
            clock,
        }
    }

    fn authority(&self) -> Authority<'_> {
        Authority::new(&self.roles, &self.reviews)
    }

    fn assessment(&self, id: &AssessmentId) -> Result<Assessment, WorkflowError> {
        self.ledger
            .get(id)
            .ok_or_else(|| WorkflowError::not_found("assessment", id))
    }

    fn module(&self, id: &ModuleId) -> Result<Module, WorkflowError> {
        self.modules
            .get(id)
            .ok_or_else(|| WorkflowError::not_found("module", id))
    }

    // -- Users ---------------------------------------------------------------

    pub fn create_user(&self, new: NewUser) -> Result<User, WorkflowError> {
        let user = self.users.create(new)?;
        tracing::info!(user = %user.id, base_type = %user.base_type, "user created");
        Ok(user)
    }

    pub fn user(&self, id: &UserId) -> Result<User, WorkflowError> {
        self.users.get(id)
    }

    pub fn set_exams_officer(
        &self,
        target: &UserId,
        acting: &UserId,
        exams_officer: bool,
    ) -> Result<User, WorkflowError> {
        self.users.get(acting)?;
        self.users.set_exams_officer(target, acting, exams_officer)
    }

    pub fn bootstrap_exams_officer(&self, name: &str, email: &str) -> Result<User, WorkflowError> {
        self.users.bootstrap_exams_officer(name, email)
    }

    pub fn ensure_exams_officer_invariant(&self) -> Result<(), WorkflowError> {
        self.users.ensure_exams_officer_invariant()
    }

    // -- Modules -------------------------------------------------------------

    pub fn create_module(&self, code: &str, title: &str) -> Result<Module, WorkflowError> {
        let module = Module {
            id: ModuleId::new(),
            code: require_text("code", code, MAX_MODULE_CODE_LEN)?,
            title: require_text("title", title, MAX_MODULE_TITLE_LEN)?,
            created_at: self.clock.now(),
        };
        self.modules.insert(module.id, module.clone());
        tracing::info!(module = %module.id, code = %module.code, "module created");
        Ok(module)
    }

    pub fn get_module(&self, id: &ModuleId) -> Result<Module, WorkflowError> {
        self.module(id)
    }

    /// Assessments under a module, oldest first.
    pub fn module_assessments(&self, module: &ModuleId) -> Result<Vec<Assessment>, WorkflowError> {
        self.module(module)?;
        Ok(self.ledger.filter(|a| a.module_id == *module))
    }

    pub fn assign_module_role(
        &self,
        module: &ModuleId,
        user: &UserId,
        role: ModuleRole,
    ) -> Result<(), WorkflowError> {
        self.module(module)?;
        self.users.get(user)?;
        self.roles.assign_module_role(*module, *user, role)
    }

    pub fn remove_module_role(
        &self,
        module: &ModuleId,
        user: &UserId,
        role: ModuleRole,
    ) -> Result<(), WorkflowError> {
        self.module(module)?;
        if self.roles.remove_module_role(*module, *user, role) {
            Ok(())
        } else {
            Err(WorkflowError::not_found("module role", format!("{role} for {user}")))
        }
    }

    pub fn add_external_examiner(&self, module: &ModuleId, user: &UserId) -> Result<(), WorkflowError> {
        self.module(module)?;
        let examiner = self.users.get(user)?;
        if examiner.base_type != UserBaseType::ExternalExaminer {
            return Err(ValidationError::NotExternalExaminer.into());
        }
        self.roles.add_external_examiner(*module, *user);
        Ok(())
    }

    // -- Assessments ---------------------------------------------------------

    /// Create an assessment in `DRAFT` and auto-assign the module's first
    /// independent moderator as checker.
    pub fn create_assessment(&self, module: &ModuleId, new: NewAssessment) -> Result<Assessment, WorkflowError> {
        self.module(module)?;
        let assessment = Assessment::new(
            *module,
            &new.title,
            new.assessment_type,
            new.exam_date,
            self.clock.now(),
        )?;
        self.ledger.insert(assessment.clone());
        tracing::info!(
            assessment_id = %assessment.id,
            module = %module,
            assessment_type = %assessment.assessment_type,
            "assessment created"
        );

        let authority = self.authority();
        let checker = self
            .roles
            .module_members(module, ModuleRole::Moderator)
            .into_iter()
            .filter_map(|id| self.users.get(&id).ok())
            .find(|user| authority.can_be_checker(user, &assessment));
        if let Some(checker) = checker {
            self.roles
                .assign_assessment_role(assessment.id, checker.id, AssessmentRole::Checker)?;
            tracing::debug!(assessment_id = %assessment.id, checker = %checker.id, "moderator auto-assigned as checker");
        }
        Ok(assessment)
    }

    /// Attach content to a draft. Setter only; no transition is recorded.
    pub fn submit_content(
        &self,
        assessment: &AssessmentId,
        user: &UserId,
        content: ContentSubmission,
    ) -> Result<Assessment, WorkflowError> {
        self.users.get(user)?;
        if !self
            .roles
            .assessment_roles(assessment, user)
            .contains(&AssessmentRole::Setter)
        {
            self.assessment(assessment)?;
            return Err(WorkflowError::forbidden("only setters can submit content"));
        }
        self.ledger.update(assessment, self.clock.now(), |draft| {
            if draft.state != AssessmentState::Draft {
                return Err(WorkflowError::forbidden(format!(
                    "content can only be submitted in DRAFT, assessment is {}",
                    draft.state
                )));
            }
            draft.description = content.description.filter(|s| !s.trim().is_empty());
            draft.file_name = content.file_name.filter(|s| !s.trim().is_empty());
            draft.file_url = content.file_url.filter(|s| !s.trim().is_empty());
            Ok(())
        })?
    }

    pub fn get_assessment(&self, id: &AssessmentId) -> Result<Assessment, WorkflowError> {
        self.assessment(id)
    }

    /// The assessment with the user's role names and available actions.
    pub fn get_assessment_view(&self, id: &AssessmentId, user: &UserId) -> Result<AssessmentView, WorkflowError> {
        let assessment = self.assessment(id)?;
        let user = self.users.get(user)?;
        let mut roles: Vec<String> = self
            .roles
            .assessment_roles(id, &user.id)
            .iter()
            .map(|r| r.to_string())
            .collect();
        if roles.is_empty() && user.is_admin() {
            roles.push("ADMIN".to_string());
        }
        let allowed_targets = self.authority().allowed_targets(&user, &assessment);
        Ok(AssessmentView {
            assessment,
            roles,
            allowed_targets,
        })
    }

    /// Everything for admin-class users; otherwise assessments on modules
    /// the user staffs plus assessments the user holds a role on.
    pub fn assessments_visible_to(&self, user: &UserId) -> Result<Vec<Assessment>, WorkflowError> {
        let user = self.users.get(user)?;
        if user.is_admin() {
            return Ok(self.ledger.list());
        }
        let modules = self.roles.modules_for(&user.id);
        let assigned = self.roles.assessments_for(&user.id);
        Ok(self
            .ledger
            .filter(|a| modules.contains(&a.module_id) || assigned.contains(&a.id)))
    }

    // -- Transitions ---------------------------------------------------------

    /// States the user may move the assessment to, in policy order.
    pub fn get_allowed_targets(
        &self,
        assessment: &AssessmentId,
        user: &UserId,
    ) -> Result<Vec<AssessmentState>, WorkflowError> {
        self.assessment_with_targets(assessment, user)
            .map(|(_, targets)| targets)
    }

    /// The assessment together with the user's allowed targets, both taken
    /// from the same snapshot.
    pub fn assessment_with_targets(
        &self,
        assessment: &AssessmentId,
        user: &UserId,
    ) -> Result<(Assessment, Vec<AssessmentState>), WorkflowError> {
        let assessment = self.assessment(assessment)?;
        let user = self.users.get(user)?;
        let targets = self.authority().allowed_targets(&user, &assessment);
        Ok((assessment, targets))
    }

    pub fn progress(&self, user: &UserId, request: TransitionRequest) -> Result<Assessment, WorkflowError> {
        let user = self.users.get(user)?;
        self.executor.progress(&user, request)
    }

    /// Policy-bypassing transition, flagged as an override in the audit
    /// trail. Callers must restrict access before reaching this method.
    pub fn override_transition(&self, user: &UserId, request: TransitionRequest) -> Result<Assessment, WorkflowError> {
        let user = self.users.get(user)?;
        self.executor.force(&user, request)
    }

    /// Audit trail, most recent first.
    pub fn list_transitions(&self, assessment: &AssessmentId) -> Result<Vec<Transition>, WorkflowError> {
        Ok(self.ledger.transitions(assessment)?)
    }

    // -- Assessment roles ----------------------------------------------------

    pub fn assign_role(
        &self,
        assessment: &AssessmentId,
        user: &UserId,
        role: AssessmentRole,
    ) -> Result<(), WorkflowError> {
        let assessment = self.assessment(assessment)?;
        let user = self.users.get(user)?;
        if role == AssessmentRole::Checker {
            self.authority().check_checker_independence(&user, &assessment)?;
        }
        self.roles.assign_assessment_role(assessment.id, user.id, role)?;
        tracing::info!(assessment_id = %assessment.id, user = %user.id, role = %role, "assessment role assigned");
        Ok(())
    }

    /// Who holds which role on the assessment, in assignment order.
    pub fn assessment_roles(&self, assessment: &AssessmentId) -> Result<Vec<RoleHolder>, WorkflowError> {
        self.assessment(assessment)?;
        Ok(self
            .roles
            .assessment_members(assessment)
            .into_iter()
            .filter_map(|(user, role)| {
                self.users.get(&user).ok().map(|u| RoleHolder {
                    user_id: u.id,
                    name: u.name,
                    email: u.email,
                    base_type: u.base_type,
                    role,
                })
            })
            .collect())
    }

    pub fn remove_role(
        &self,
        assessment: &AssessmentId,
        user: &UserId,
        role: AssessmentRole,
    ) -> Result<(), WorkflowError> {
        self.assessment(assessment)?;
        self.users.get(user)?;
        if self.roles.remove_assessment_role(*assessment, *user, role) {
            tracing::info!(assessment_id = %assessment, user = %user, role = %role, "assessment role removed");
            Ok(())
        } else {
            Err(WorkflowError::not_found("role assignment", format!("{role} for {user}")))
        }
    }

    // -- Exam review records -------------------------------------------------

    pub fn submit_external_feedback(
        &self,
        assessment: &AssessmentId,
        examiner: &UserId,
        feedback: &str,
    ) -> Result<ExternalFeedback, WorkflowError> {
        let assessment = self.assessment(assessment)?;
        let examiner = self.users.get(examiner)?;
        let feedback = require_text("feedback", feedback, MAX_REVIEW_LEN)?;
        if !self.authority().can_submit_external_feedback(&examiner, &assessment) {
            return Err(WorkflowError::Ineligible(
                "user cannot submit external feedback for this assessment".into(),
            ));
        }
        let record = ExternalFeedback {
            assessment_id: assessment.id,
            examiner: examiner.id,
            feedback,
            submitted_at: self.clock.now(),
        };
        if !self.reviews.record_feedback(record.clone()) {
            return Err(WorkflowError::Ineligible("external feedback already submitted".into()));
        }
        tracing::info!(assessment_id = %assessment.id, examiner = %examiner.id, "external feedback submitted");
        Ok(record)
    }

    pub fn submit_setter_response(
        &self,
        assessment: &AssessmentId,
        setter: &UserId,
        response: &str,
        document_ref: Option<String>,
    ) -> Result<SetterResponse, WorkflowError> {
        let assessment = self.assessment(assessment)?;
        let setter = self.users.get(setter)?;
        let response = require_text("response", response, MAX_REVIEW_LEN)?;
        if !self.authority().can_submit_setter_response(&setter, &assessment) {
            return Err(WorkflowError::Ineligible(
                "user cannot submit a setter response for this assessment".into(),
            ));
        }
        let record = SetterResponse {
            assessment_id: assessment.id,
            setter: setter.id,
            response,
            document_ref: document_ref.filter(|d| !d.trim().is_empty()),
            submitted_at: self.clock.now(),
        };
        if !self.reviews.record_response(record.clone()) {
            return Err(WorkflowError::Ineligible("setter response already submitted".into()));
        }
        tracing::info!(assessment_id = %assessment.id, setter = %setter.id, "setter response submitted");
        Ok(record)
    }

    pub fn external_feedback(&self, assessment: &AssessmentId) -> Result<ExternalFeedback, WorkflowError> {
        self.assessment(assessment)?;
        self.reviews
            .feedback(assessment)
            .ok_or_else(|| WorkflowError::not_found("external feedback", assessment))
    }

    pub fn setter_response(&self, assessment: &AssessmentId) -> Result<SetterResponse, WorkflowError> {
        self.assessment(assessment)?;
        self.reviews
            .response(assessment)
            .ok_or_else(|| WorkflowError::not_found("setter response", assessment))
    }

    // -- Scheduled -----------------------------------------------------------

    /// Run the exam auto-progress job for `today`.
    pub fn auto_progress_exams(&self, today: NaiveDate) -> AutoProgressSummary {
        scheduler::auto_progress_exams(&self.ledger, &self.executor, today)
    }

    /// Run the auto-progress job for the clock's current date.
    pub fn auto_progress_due_exams(&self) -> AutoProgressSummary {
        self.auto_progress_exams(self.clock.now().date())
    }
}
