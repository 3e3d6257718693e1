//! # amt-core: Foundational Types for the Assessment Workflow
//!
//! The leaf of the workspace dependency graph. Defines the identifier
//! newtypes, the UTC timestamp used on every audit record, the injectable
//! [`Clock`], and the validation error shared by the domain crates.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `amt-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{AssessmentId, ModuleId, TransitionId, UserId};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
