//! # User Registry
//!
//! Owns user records and the system invariant that at least one academic
//! exams officer always exists once one has been seeded. Every change that
//! could remove exams-officer status checks the invariant under the same
//! write lock that applies the change.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use amt_core::error::require_text;
use amt_core::{UserId, ValidationError};
use amt_workflow::{User, UserBaseType};

use crate::error::WorkflowError;

const MAX_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 320;

/// Input for [`UserRegistry::create`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub base_type: UserBaseType,
    pub exams_officer: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Emails are unique ignoring case.
    pub fn create(&self, new: NewUser) -> Result<User, WorkflowError> {
        let name = require_text("name", &new.name, MAX_NAME_LEN)?;
        let email = require_text("email", &new.email, MAX_EMAIL_LEN)?.to_lowercase();
        if new.exams_officer && new.base_type != UserBaseType::Academic {
            return Err(ValidationError::ExamsOfficerNotAcademic.into());
        }

        let mut guard = self.users.write();
        if guard.values().any(|u| u.email == email) {
            return Err(WorkflowError::DuplicateEmail(email));
        }
        let user = User {
            id: UserId::new(),
            name,
            email,
            base_type: new.base_type,
            exams_officer: new.exams_officer,
        };
        guard.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get(&self, id: &UserId) -> Result<User, WorkflowError> {
        self.users
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found("user", id))
    }

    /// Grant or revoke exams-officer status on `target`, acting as `acting`.
    ///
    /// Revocation fails when `target` is the last academic exams officer
    /// or when `acting` is revoking their own status.
    pub fn set_exams_officer(
        &self,
        target: &UserId,
        acting: &UserId,
        exams_officer: bool,
    ) -> Result<User, WorkflowError> {
        let mut guard = self.users.write();
        let current = guard
            .get(target)
            .ok_or_else(|| WorkflowError::not_found("user", target))?;

        if current.base_type != UserBaseType::Academic {
            return Err(ValidationError::ExamsOfficerNotAcademic.into());
        }

        if current.exams_officer && !exams_officer {
            let officers = guard.values().filter(|u| u.is_exams_officer()).count();
            if officers <= 1 {
                return Err(WorkflowError::ExamsOfficerInvariant(
                    "there must be at least one academic exams officer".into(),
                ));
            }
            if target == acting {
                return Err(WorkflowError::ExamsOfficerInvariant(
                    "exams officers cannot remove their own status".into(),
                ));
            }
        }

        let user = guard
            .get_mut(target)
            .ok_or_else(|| WorkflowError::not_found("user", target))?;
        user.exams_officer = exams_officer;
        tracing::info!(user = %target, by = %acting, exams_officer, "exams officer status changed");
        Ok(user.clone())
    }

    /// Seed the first exams officer. Returns an existing academic exams
    /// officer unchanged if there already is one.
    pub fn bootstrap_exams_officer(&self, name: &str, email: &str) -> Result<User, WorkflowError> {
        if let Some(existing) = self.exams_officers().into_iter().next() {
            return Ok(existing);
        }
        let user = self.create(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            base_type: UserBaseType::Academic,
            exams_officer: true,
        })?;
        tracing::info!(user = %user.id, "bootstrapped exams officer");
        Ok(user)
    }

    /// Academic users with exams-officer status.
    pub fn exams_officers(&self) -> Vec<User> {
        self.users
            .read()
            .values()
            .filter(|u| u.is_exams_officer())
            .cloned()
            .collect()
    }

    /// Fails unless at least one academic exams officer exists.
    pub fn ensure_exams_officer_invariant(&self) -> Result<(), WorkflowError> {
        if self.users.read().values().any(User::is_exams_officer) {
            Ok(())
        } else {
            Err(WorkflowError::ExamsOfficerInvariant(
                "no academic exams officer is registered".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, base_type: UserBaseType, exams_officer: bool) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.ac.uk", name.to_lowercase()),
            base_type,
            exams_officer,
        }
    }

    #[test]
    fn create_rejects_blank_and_duplicate() {
        let registry = UserRegistry::new();
        let err = registry
            .create(new_user(" ", UserBaseType::Academic, false))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ValidationError::Blank { field: "name" })));

        registry
            .create(new_user("Ada", UserBaseType::Academic, false))
            .unwrap();
        let mut dup = new_user("Other", UserBaseType::Academic, false);
        dup.email = "ADA@example.ac.uk".into();
        assert!(matches!(
            registry.create(dup),
            Err(WorkflowError::DuplicateEmail(_))
        ));
    }

    #[test]
    fn only_academics_can_be_exams_officers() {
        let registry = UserRegistry::new();
        let err = registry
            .create(new_user("Tess", UserBaseType::TeachingSupport, true))
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::Validation(ValidationError::ExamsOfficerNotAcademic)
        );

        let ext = registry
            .create(new_user("Eve", UserBaseType::ExternalExaminer, false))
            .unwrap();
        assert!(registry.set_exams_officer(&ext.id, &ext.id, true).is_err());
    }

    #[test]
    fn last_exams_officer_cannot_be_removed() {
        let registry = UserRegistry::new();
        let eo = registry.bootstrap_exams_officer("Olive", "olive@example.ac.uk").unwrap();
        let admin = registry
            .create(new_user("Tess", UserBaseType::TeachingSupport, false))
            .unwrap();
        let err = registry.set_exams_officer(&eo.id, &admin.id, false).unwrap_err();
        assert!(matches!(err, WorkflowError::ExamsOfficerInvariant(_)));
        assert!(registry.ensure_exams_officer_invariant().is_ok());
    }

    #[test]
    fn exams_officer_cannot_demote_self() {
        let registry = UserRegistry::new();
        let first = registry.bootstrap_exams_officer("Olive", "olive@example.ac.uk").unwrap();
        let second = registry
            .create(new_user("Sam", UserBaseType::Academic, true))
            .unwrap();
        assert!(matches!(
            registry.set_exams_officer(&second.id, &second.id, false),
            Err(WorkflowError::ExamsOfficerInvariant(_))
        ));
        let demoted = registry.set_exams_officer(&second.id, &first.id, false).unwrap();
        assert!(!demoted.exams_officer);
        assert_eq!(registry.exams_officers(), vec![first]);
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let registry = UserRegistry::new();
        assert!(registry.ensure_exams_officer_invariant().is_err());
        let first = registry.bootstrap_exams_officer("Olive", "olive@example.ac.uk").unwrap();
        let again = registry.bootstrap_exams_officer("Other", "other@example.ac.uk").unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let registry = UserRegistry::new();
        let id = UserId::new();
        assert!(matches!(registry.get(&id), Err(WorkflowError::NotFound { kind: "user", .. })));
    }
}
