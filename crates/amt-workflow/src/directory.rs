//! # Lookup Seams
//!
//! The authorization matrix never assumes roles or review records are
//! preloaded on the assessment. Every check goes through these traits,
//! which the engine implements over its stores.

use amt_core::{AssessmentId, ModuleId, UserId};

use crate::roles::{AssessmentRole, ModuleRole, ResolvedRoles};

/// Resolves module-level and assessment-level roles for a user.
pub trait RoleDirectory: Send + Sync {
    /// Roles `user` holds on `assessment` (setter, checker).
    fn assessment_roles(&self, assessment: &AssessmentId, user: &UserId) -> Vec<AssessmentRole>;

    /// Roles `user` holds on `module` (lead, moderator, staff).
    fn module_roles(&self, module: &ModuleId, user: &UserId) -> Vec<ModuleRole>;

    /// Whether `user` is an external examiner assigned to `module`.
    fn is_external_examiner_for(&self, module: &ModuleId, user: &UserId) -> bool;

    /// Resolve both role layers for one check.
    fn resolve(&self, assessment: &AssessmentId, module: &ModuleId, user: &UserId) -> ResolvedRoles {
        ResolvedRoles {
            assessment_roles: self.assessment_roles(assessment, user),
            module_roles: self.module_roles(module, user),
        }
    }
}

/// Existence checks for the exam review records that gate transitions.
pub trait ReviewRecords: Send + Sync {
    /// Whether an external examiner has submitted feedback.
    fn has_external_feedback(&self, assessment: &AssessmentId) -> bool;

    /// Whether the setter has responded to the external feedback.
    fn has_setter_response(&self, assessment: &AssessmentId) -> bool;
}
