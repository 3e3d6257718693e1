//! # Transition Executor
//!
//! The single writer of assessment state. Every path that moves an
//! assessment (user progress, admin override, the auto-progress job) comes
//! through here and ends in one [`AssessmentLedger::commit`].
//!
//! ## Sequence
//!
//! 1. Snapshot the assessment (`NotFound` if absent).
//! 2. If the caller supplied an expected version, compare it now.
//! 3. Decide: authorization matrix for users, nothing for overrides,
//!    structural validity only for the system actor.
//! 4. Commit against the snapshot's version. A concurrent commit in
//!    between turns into `Conflict` and nothing is written.

use std::sync::Arc;

use amt_core::{AssessmentId, Clock};
use amt_workflow::{
    is_valid_transition, Actor, Assessment, AssessmentState, Authority, Grant, Transition, User,
};

use crate::directory::RoleRegistry;
use crate::error::WorkflowError;
use crate::ledger::AssessmentLedger;
use crate::reviews::ReviewStore;

/// A requested move of one assessment to a new state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub assessment_id: AssessmentId,
    pub target: AssessmentState,
    pub note: Option<String>,
    /// When set, the call fails with `Conflict` unless the assessment is
    /// still at this version.
    pub expected_version: Option<u64>,
}

impl TransitionRequest {
    pub fn new(assessment_id: AssessmentId, target: AssessmentState) -> Self {
        Self {
            assessment_id,
            target,
            note: None,
            expected_version: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn at_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

#[derive(Clone)]
pub struct TransitionExecutor {
    ledger: AssessmentLedger,
    roles: RoleRegistry,
    reviews: ReviewStore,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TransitionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionExecutor").finish_non_exhaustive()
    }
}

impl TransitionExecutor {
    pub fn new(
        ledger: AssessmentLedger,
        roles: RoleRegistry,
        reviews: ReviewStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            roles,
            reviews,
            clock,
        }
    }

    /// Normal progress. Non-admin users need a structural edge and a rule
    /// grant; admin-class users always pass, and their transition is
    /// flagged as an override when no rule would have granted it.
    pub fn progress(&self, user: &User, request: TransitionRequest) -> Result<Assessment, WorkflowError> {
        let roles = self.roles.clone();
        let reviews = self.reviews.clone();
        self.execute(Actor::user(user), request, move |snapshot, target| {
            let authority = Authority::new(&roles, &reviews);
            match authority.authorize(user, snapshot, target) {
                Ok(Grant::Rule) => Ok(false),
                Ok(Grant::AdminAuthority) => Ok(true),
                Err(denial) => {
                    tracing::debug!(
                        assessment_id = %snapshot.id,
                        actor = %user.id,
                        reason = %denial,
                        "transition denied"
                    );
                    Err(denial.into())
                }
            }
        })
    }

    /// Policy-bypassing move to any state. Who may call this is decided
    /// before the request reaches the executor.
    pub fn force(&self, user: &User, request: TransitionRequest) -> Result<Assessment, WorkflowError> {
        self.execute(Actor::user(user), request, |_, _| Ok(true))
    }

    /// Progress on behalf of an automatic process. No identity checks, but
    /// the edge must exist and the version check still applies.
    pub fn progress_as_system(
        &self,
        actor_name: &str,
        request: TransitionRequest,
    ) -> Result<Assessment, WorkflowError> {
        self.execute(Actor::system(actor_name), request, |snapshot, target| {
            if is_valid_transition(snapshot.assessment_type, snapshot.state, target) {
                Ok(false)
            } else {
                Err(WorkflowError::InvalidTransition {
                    assessment_type: snapshot.assessment_type,
                    from: snapshot.state,
                    to: target,
                })
            }
        })
    }

    fn execute(
        &self,
        actor: Actor,
        request: TransitionRequest,
        decide: impl FnOnce(&Assessment, AssessmentState) -> Result<bool, WorkflowError>,
    ) -> Result<Assessment, WorkflowError> {
        let id = request.assessment_id;
        let snapshot = self
            .ledger
            .get(&id)
            .ok_or_else(|| WorkflowError::not_found("assessment", id))?;

        if let Some(expected) = request.expected_version {
            if expected != snapshot.version {
                tracing::warn!(assessment_id = %id, expected, actual = snapshot.version, "stale expected version");
                return Err(WorkflowError::Conflict {
                    assessment_id: id,
                    expected,
                    actual: snapshot.version,
                });
            }
        }

        let is_override = decide(&snapshot, request.target)?;
        let at = self.clock.now();
        let note = request.note;
        let target = request.target;

        let (updated, transition) = self
            .ledger
            .commit(&id, snapshot.version, |current, sequence| {
                Transition::forward(
                    current.id,
                    sequence,
                    current.state,
                    target,
                    at,
                    &actor,
                    note,
                    is_override,
                )
            })
            .map_err(|e| {
                tracing::warn!(assessment_id = %id, error = %e, "transition lost a concurrent race");
                WorkflowError::from(e)
            })?;

        if transition.is_override {
            tracing::warn!(
                assessment_id = %id,
                from = %transition.from_state,
                to = %transition.to_state,
                actor = %actor,
                "override transition committed"
            );
        } else {
            tracing::info!(
                assessment_id = %id,
                from = %transition.from_state,
                to = %transition.to_state,
                actor = %actor,
                "transition committed"
            );
        }
        Ok(updated)
    }
}
