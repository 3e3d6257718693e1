//! # User Management API
//!
//! Creating users and granting or revoking exams-officer status. Both are
//! restricted to teaching support and exams officers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use amt_core::UserId;
use amt_engine::NewUser;
use amt_workflow::{User, UserBaseType};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{check_len, check_present, extract_json, extract_validated_json, Validate};
use crate::state::AppState;

/// Request to register a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub base_type: UserBaseType,
    #[serde(default)]
    pub exams_officer: bool,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        check_present("name", &self.name)?;
        check_present("email", &self.email)?;
        check_len("name", &self.name, 255)?;
        if !self.email.contains('@') {
            return Err("email must contain '@'".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ExamsOfficerRequest {
    pub exams_officer: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(create_user))
        .route("/v1/users/{id}/exams-officer", post(set_exams_officer))
}

/// POST /v1/users
async fn create_user(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    caller.require_manager()?;
    let req = extract_validated_json(body)?;
    let user = state.service.create_user(NewUser {
        name: req.name,
        email: req.email,
        base_type: req.base_type,
        exams_officer: req.exams_officer,
    })?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /v1/users/{id}/exams-officer
async fn set_exams_officer(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<UserId>,
    body: Result<Json<ExamsOfficerRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    caller.require_manager()?;
    let req = extract_json(body)?;
    let user = state
        .service
        .set_exams_officer(&id, &caller.id(), req.exams_officer)?;
    Ok(Json(user))
}
