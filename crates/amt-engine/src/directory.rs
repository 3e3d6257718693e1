//! # Role Directory
//!
//! In-memory registry of module staff roles, assessment roles, and
//! external examiner attachments. Assignments are kept in insertion order
//! so "first moderator" is well defined.

use std::sync::Arc;

use parking_lot::RwLock;

use amt_core::{AssessmentId, ModuleId, UserId};
use amt_workflow::{AssessmentRole, ModuleRole, RoleDirectory};

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModuleAssignment {
    module: ModuleId,
    user: UserId,
    role: ModuleRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AssessmentAssignment {
    assessment: AssessmentId,
    user: UserId,
    role: AssessmentRole,
}

#[derive(Debug, Default)]
struct Assignments {
    module: Vec<ModuleAssignment>,
    assessment: Vec<AssessmentAssignment>,
    external_examiners: Vec<(ModuleId, UserId)>,
}

/// Shared handle to all role assignments.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    inner: Arc<RwLock<Assignments>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a module role. Each `(module, user, role)` triple is unique.
    pub fn assign_module_role(
        &self,
        module: ModuleId,
        user: UserId,
        role: ModuleRole,
    ) -> Result<(), WorkflowError> {
        let entry = ModuleAssignment { module, user, role };
        let mut guard = self.inner.write();
        if guard.module.contains(&entry) {
            return Err(WorkflowError::DuplicateRole {
                role: role.to_string(),
                scope: "module",
            });
        }
        guard.module.push(entry);
        Ok(())
    }

    /// Revoke a module role. Returns whether it was held.
    pub fn remove_module_role(&self, module: ModuleId, user: UserId, role: ModuleRole) -> bool {
        let entry = ModuleAssignment { module, user, role };
        let mut guard = self.inner.write();
        let before = guard.module.len();
        guard.module.retain(|a| *a != entry);
        guard.module.len() != before
    }

    /// Grant an assessment role. Independence is the caller's concern;
    /// uniqueness of the triple is enforced here.
    pub fn assign_assessment_role(
        &self,
        assessment: AssessmentId,
        user: UserId,
        role: AssessmentRole,
    ) -> Result<(), WorkflowError> {
        let entry = AssessmentAssignment {
            assessment,
            user,
            role,
        };
        let mut guard = self.inner.write();
        if guard.assessment.contains(&entry) {
            return Err(WorkflowError::DuplicateRole {
                role: role.to_string(),
                scope: "assessment",
            });
        }
        guard.assessment.push(entry);
        Ok(())
    }

    /// Revoke an assessment role. Returns whether it was held.
    pub fn remove_assessment_role(
        &self,
        assessment: AssessmentId,
        user: UserId,
        role: AssessmentRole,
    ) -> bool {
        let entry = AssessmentAssignment {
            assessment,
            user,
            role,
        };
        let mut guard = self.inner.write();
        let before = guard.assessment.len();
        guard.assessment.retain(|a| *a != entry);
        guard.assessment.len() != before
    }

    /// Attach an external examiner to a module. Idempotent.
    pub fn add_external_examiner(&self, module: ModuleId, user: UserId) {
        let mut guard = self.inner.write();
        if !guard.external_examiners.contains(&(module, user)) {
            guard.external_examiners.push((module, user));
        }
    }

    /// Users holding `role` on `module`, in assignment order.
    pub fn module_members(&self, module: &ModuleId, role: ModuleRole) -> Vec<UserId> {
        self.inner
            .read()
            .module
            .iter()
            .filter(|a| a.module == *module && a.role == role)
            .map(|a| a.user)
            .collect()
    }

    /// Modules on which `user` holds any staff role.
    pub fn modules_for(&self, user: &UserId) -> Vec<ModuleId> {
        let guard = self.inner.read();
        let mut modules: Vec<ModuleId> = Vec::new();
        for a in guard.module.iter().filter(|a| a.user == *user) {
            if !modules.contains(&a.module) {
                modules.push(a.module);
            }
        }
        modules
    }

    /// Every `(user, role)` held on `assessment`, in assignment order.
    pub fn assessment_members(&self, assessment: &AssessmentId) -> Vec<(UserId, AssessmentRole)> {
        self.inner
            .read()
            .assessment
            .iter()
            .filter(|a| a.assessment == *assessment)
            .map(|a| (a.user, a.role))
            .collect()
    }

    /// Assessments on which `user` holds any role.
    pub fn assessments_for(&self, user: &UserId) -> Vec<AssessmentId> {
        let guard = self.inner.read();
        let mut assessments: Vec<AssessmentId> = Vec::new();
        for a in guard.assessment.iter().filter(|a| a.user == *user) {
            if !assessments.contains(&a.assessment) {
                assessments.push(a.assessment);
            }
        }
        assessments
    }
}

impl RoleDirectory for RoleRegistry {
    fn assessment_roles(&self, assessment: &AssessmentId, user: &UserId) -> Vec<AssessmentRole> {
        self.inner
            .read()
            .assessment
            .iter()
            .filter(|a| a.assessment == *assessment && a.user == *user)
            .map(|a| a.role)
            .collect()
    }

    fn module_roles(&self, module: &ModuleId, user: &UserId) -> Vec<ModuleRole> {
        self.inner
            .read()
            .module
            .iter()
            .filter(|a| a.module == *module && a.user == *user)
            .map(|a| a.role)
            .collect()
    }

    fn is_external_examiner_for(&self, module: &ModuleId, user: &UserId) -> bool {
        self.inner
            .read()
            .external_examiners
            .contains(&(*module, *user))
    }
}
