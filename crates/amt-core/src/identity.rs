//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every identifier in the workflow. An `AssessmentId`
//! cannot be passed where a `UserId` is expected, which rules out the
//! argument-swap mistakes that plain UUIDs invite in the role and
//! transition APIs (both take an assessment and a user).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_newtype!(
    /// Unique identifier for a user (academic, teaching support, external examiner).
    UserId,
    "user"
);

uuid_newtype!(
    /// Unique identifier for a taught module.
    ModuleId,
    "module"
);

uuid_newtype!(
    /// Unique identifier for an assessment (coursework, test, or exam).
    AssessmentId,
    "assessment"
);

uuid_newtype!(
    /// Unique identifier for a recorded state transition.
    TransitionId,
    "transition"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_namespace_prefix() {
        let uuid = Uuid::nil();
        assert_eq!(
            AssessmentId::from_uuid(uuid).to_string(),
            "assessment:00000000-0000-0000-0000-000000000000"
        );
        assert!(UserId::from_uuid(uuid).to_string().starts_with("user:"));
    }

    #[test]
    fn new_ids_are_distinct() {
        assert_ne!(ModuleId::new(), ModuleId::new());
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = TransitionId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
        let back: TransitionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
