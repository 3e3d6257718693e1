//! # Caller Identity
//!
//! Authentication happens upstream. This service trusts the `X-User-Id`
//! header and resolves it against the user registry; an absent, malformed
//! or unknown ID is a 401.
//!
//! Authorization of workflow actions stays in the engine. The only checks
//! made here are the access-control gates in front of administrative
//! routes (override, user, module and role management).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use amt_core::UserId;
use amt_workflow::User;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user: User,
}

impl CallerIdentity {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    /// Teaching support or exams officer: may manage users, modules and
    /// role assignments, and may override transitions.
    pub fn can_manage(&self) -> bool {
        self.user.is_admin() || self.user.is_exams_officer()
    }

    /// Fails with 403 unless the caller can manage.
    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.can_manage() {
            Ok(())
        } else {
            Err(AppError::forbidden("requires teaching support or exams officer"))
        }
    }
}

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing X-User-Id header".into()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("X-User-Id is not valid text".into()))?;
        let id = Uuid::parse_str(raw.trim())
            .map(UserId::from_uuid)
            .map_err(|_| AppError::Unauthorized("X-User-Id is not a UUID".into()))?;
        let user = state
            .service
            .user(&id)
            .map_err(|_| AppError::Unauthorized(format!("unknown user {id}")))?;
        Ok(Self { user })
    }
}
