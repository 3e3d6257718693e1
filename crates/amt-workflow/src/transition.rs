//! # Transition Records
//!
//! A transition is written exactly once, by the executor, in the same
//! atomic step that moves the assessment's state. It is never updated or
//! deleted, and it is the only historical record of how an assessment got
//! where it is.

use serde::{Deserialize, Serialize};

use amt_core::{AssessmentId, Timestamp, TransitionId, UserId};

use crate::roles::User;
use crate::state::AssessmentState;

/// Who caused a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// A human user.
    User { id: UserId, display_name: String },
    /// An automatic process (e.g. the exam auto-progress job).
    System { display_name: String },
}

impl Actor {
    /// The actor for a human user, displayed by name.
    pub fn user(user: &User) -> Self {
        Self::User {
            id: user.id,
            display_name: user.name.clone(),
        }
    }

    /// A system actor with the given display name.
    pub fn system(display_name: impl Into<String>) -> Self {
        Self::System {
            display_name: display_name.into(),
        }
    }

    /// The acting user, or `None` for the system.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User { id, .. } => Some(*id),
            Self::System { .. } => None,
        }
    }

    /// Always set, even for system actors.
    pub fn display_name(&self) -> &str {
        match self {
            Self::User { display_name, .. } | Self::System { display_name } => display_name,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User { id, display_name } => write!(f, "{display_name} ({id})"),
            Self::System { display_name } => f.write_str(display_name),
        }
    }
}

/// Immutable audit record of one state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub assessment_id: AssessmentId,
    /// Position in the assessment's log, starting at 0. Orders records
    /// that share a timestamp.
    pub sequence: u64,
    pub from_state: AssessmentState,
    pub to_state: AssessmentState,
    /// Server-assigned.
    pub at: Timestamp,
    /// `None` for system actors.
    pub by_user: Option<UserId>,
    pub by_display_name: String,
    pub note: Option<String>,
    /// Created by a policy-bypassing admin action.
    pub is_override: bool,
    pub is_reversion: bool,
    pub reverted_transition: Option<TransitionId>,
}

impl Transition {
    /// Build a forward (non-reversion) transition record.
    #[allow(clippy::too_many_arguments)]
    pub fn forward(
        assessment_id: AssessmentId,
        sequence: u64,
        from_state: AssessmentState,
        to_state: AssessmentState,
        at: Timestamp,
        actor: &Actor,
        note: Option<String>,
        is_override: bool,
    ) -> Self {
        Self {
            id: TransitionId::new(),
            assessment_id,
            sequence,
            from_state,
            to_state,
            at,
            by_user: actor.user_id(),
            by_display_name: actor.display_name().to_string(),
            note: note.filter(|n| !n.trim().is_empty()),
            is_override,
            is_reversion: false,
            reverted_transition: None,
        }
    }
}
