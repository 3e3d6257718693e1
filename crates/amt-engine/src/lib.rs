//! # amt-engine
//!
//! The stateful half of the assessment workflow. Everything here is
//! in-memory and synchronous; locks are `parking_lot` and are never held
//! across an `.await`.
//!
//! ## Write path
//!
//! ```text
//! WorkflowService::progress
//!   └─ TransitionExecutor::progress
//!        ├─ AssessmentLedger::get           (snapshot)
//!        ├─ Authority::authorize            (RoleRegistry, ReviewStore lookups)
//!        └─ AssessmentLedger::commit        (version check + append + state, one lock)
//! ```

pub mod directory;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod records;
pub mod reviews;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod users;

pub use directory::RoleRegistry;
pub use error::WorkflowError;
pub use executor::{TransitionExecutor, TransitionRequest};
pub use ledger::{AssessmentLedger, LedgerError};
pub use records::{ExternalFeedback, Module, SetterResponse};
pub use reviews::ReviewStore;
pub use scheduler::{last_working_day, AutoProgressSummary, AUTO_PROGRESS_NOTE, SYSTEM_ACTOR};
pub use service::{AssessmentView, ContentSubmission, NewAssessment, RoleHolder, WorkflowService};
pub use store::Store;
pub use users::{NewUser, UserRegistry};
