//! # Users and Roles
//!
//! Three layers of authority feed the authorization matrix:
//!
//! - **Base type** of the user (academic, teaching support, external examiner),
//!   plus the global exams-officer flag.
//! - **Module roles** held on the assessment's module (lead, moderator, staff).
//! - **Assessment roles** held on the assessment itself (setter, checker).

use serde::{Deserialize, Serialize};

use amt_core::{UserId, ValidationError};

/// Immutable classification of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserBaseType {
    /// Teaching staff. Only academics may be exams officers or checkers.
    Academic,
    /// Administrative staff. Admin-class authority.
    TeachingSupport,
    /// External examiner attached to one or more modules.
    ExternalExaminer,
}

impl UserBaseType {
    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "ACADEMIC",
            Self::TeachingSupport => "TEACHING_SUPPORT",
            Self::ExternalExaminer => "EXTERNAL_EXAMINER",
        }
    }
}

impl std::fmt::Display for UserBaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role held on a single assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentRole {
    /// Authors the assessment content.
    Setter,
    /// Independent reviewer.
    Checker,
}

impl AssessmentRole {
    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setter => "SETTER",
            Self::Checker => "CHECKER",
        }
    }
}

impl std::fmt::Display for AssessmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SETTER" => Ok(Self::Setter),
            "CHECKER" => Ok(Self::Checker),
            other => Err(ValidationError::Unrecognized {
                kind: "assessment role",
                value: other.to_string(),
            }),
        }
    }
}

/// Role held on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleRole {
    /// Release and scheduling authority.
    ModuleLead,
    /// Responsible for moderation-stage transitions.
    Moderator,
    /// General teaching staff.
    Staff,
}

impl ModuleRole {
    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModuleLead => "MODULE_LEAD",
            Self::Moderator => "MODERATOR",
            Self::Staff => "STAFF",
        }
    }
}

impl std::fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub base_type: UserBaseType,
    /// Raw flag. Use [`User::is_exams_officer`], which ignores the flag on
    /// non-academics.
    pub exams_officer: bool,
}

impl User {
    /// Admin-class users (teaching support) may perform any transition.
    pub fn is_admin(&self) -> bool {
        self.base_type == UserBaseType::TeachingSupport
    }

    /// Exams-officer authority. Only meaningful for academics.
    pub fn is_exams_officer(&self) -> bool {
        self.exams_officer && self.base_type == UserBaseType::Academic
    }

    /// Whether the user is an external examiner.
    pub fn is_external_examiner(&self) -> bool {
        self.base_type == UserBaseType::ExternalExaminer
    }
}

/// A user's roles resolved against one assessment and its module.
///
/// Built fresh from the [`RoleDirectory`](crate::directory::RoleDirectory)
/// for every check; never cached across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRoles {
    pub assessment_roles: Vec<AssessmentRole>,
    pub module_roles: Vec<ModuleRole>,
}

impl ResolvedRoles {
    pub fn is_setter(&self) -> bool {
        self.assessment_roles.contains(&AssessmentRole::Setter)
    }

    pub fn is_checker(&self) -> bool {
        self.assessment_roles.contains(&AssessmentRole::Checker)
    }

    pub fn is_module_lead(&self) -> bool {
        self.module_roles.contains(&ModuleRole::ModuleLead)
    }

    pub fn is_moderator(&self) -> bool {
        self.module_roles.contains(&ModuleRole::Moderator)
    }

    /// Holds any role at all on the module.
    pub fn is_module_staff(&self) -> bool {
        !self.module_roles.is_empty()
    }
}
