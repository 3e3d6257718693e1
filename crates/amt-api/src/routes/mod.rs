//! # Route Modules
//!
//! Each module exposes a `router()` returning `Router<AppState>`; they
//! are merged in [`crate::app`].

pub mod assessments;
pub mod modules;
pub mod users;
