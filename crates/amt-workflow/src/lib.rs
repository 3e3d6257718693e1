//! # amt-workflow
//!
//! The assessment lifecycle as pure domain logic. Nothing in this crate
//! stores data, takes locks, or reads a clock; storage and concurrency
//! live in `amt-engine`.
//!
//! - [`state`]: assessment types and the twenty lifecycle states.
//! - [`policy`]: the structural transition graph per type.
//! - [`roles`]: user base types, module roles, assessment roles.
//! - [`directory`]: lookup traits the authorization matrix reads through.
//! - [`authority`]: the authorization matrix and eligibility checks.
//! - [`assessment`]: the assessment record.
//! - [`transition`]: audit trail entries and actors.

pub mod assessment;
pub mod authority;
pub mod directory;
pub mod policy;
pub mod roles;
pub mod state;
pub mod transition;

pub use assessment::{Assessment, MAX_TITLE_LEN};
pub use authority::{Authority, Denial, Grant, IndependenceViolation};
pub use directory::{ReviewRecords, RoleDirectory};
pub use policy::{is_valid_transition, possible_next_states};
pub use roles::{AssessmentRole, ModuleRole, ResolvedRoles, User, UserBaseType};
pub use state::{AssessmentState, AssessmentType};
pub use transition::{Actor, Transition};
