//! # Module API
//!
//! Module creation, staff roles, external examiners, and creating
//! assessments under a module.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use amt_core::{ModuleId, UserId};
use amt_engine::{Module, NewAssessment};
use amt_workflow::{Assessment, AssessmentType, ModuleRole};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{check_len, check_present, extract_json, extract_validated_json, Validate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub code: String,
    pub title: String,
}

impl Validate for CreateModuleRequest {
    fn validate(&self) -> Result<(), String> {
        check_present("code", &self.code)?;
        check_present("title", &self.title)?;
        check_len("code", &self.code, 32)
    }
}

#[derive(Debug, Deserialize)]
pub struct StaffRoleRequest {
    pub user_id: UserId,
    pub role: ModuleRole,
}

#[derive(Debug, Deserialize)]
pub struct ExternalExaminerRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub title: String,
    pub assessment_type: AssessmentType,
    pub exam_date: Option<NaiveDate>,
}

impl Validate for CreateAssessmentRequest {
    fn validate(&self) -> Result<(), String> {
        check_present("title", &self.title)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/modules", post(create_module))
        .route("/v1/modules/{id}/staff", post(assign_staff))
        .route("/v1/modules/{id}/staff/{user_id}/{role}", delete(remove_staff))
        .route("/v1/modules/{id}/external-examiners", post(add_external_examiner))
        .route("/v1/modules/{id}", get(get_module))
        .route(
            "/v1/modules/{id}/assessments",
            get(list_assessments).post(create_assessment),
        )
}

/// POST /v1/modules
async fn create_module(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateModuleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Module>), AppError> {
    caller.require_manager()?;
    let req = extract_validated_json(body)?;
    let module = state.service.create_module(&req.code, &req.title)?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// GET /v1/modules/{id}
async fn get_module(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<ModuleId>,
) -> Result<Json<Module>, AppError> {
    Ok(Json(state.service.get_module(&id)?))
}

/// GET /v1/modules/{id}/assessments
async fn list_assessments(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<ModuleId>,
) -> Result<Json<Vec<Assessment>>, AppError> {
    Ok(Json(state.service.module_assessments(&id)?))
}

/// POST /v1/modules/{id}/staff
async fn assign_staff(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<ModuleId>,
    body: Result<Json<StaffRoleRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    let req = extract_json(body)?;
    state
        .service
        .assign_module_role(&id, &req.user_id, req.role)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/modules/{id}/staff/{user_id}/{role}
async fn remove_staff(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, user_id, role)): Path<(ModuleId, UserId, ModuleRole)>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    state.service.remove_module_role(&id, &user_id, role)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/modules/{id}/external-examiners
async fn add_external_examiner(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<ModuleId>,
    body: Result<Json<ExternalExaminerRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    let req = extract_json(body)?;
    state.service.add_external_examiner(&id, &req.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/modules/{id}/assessments
async fn create_assessment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<ModuleId>,
    body: Result<Json<CreateAssessmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Assessment>), AppError> {
    caller.require_manager()?;
    let req = extract_validated_json(body)?;
    let assessment = state.service.create_assessment(
        &id,
        NewAssessment {
            title: req.title,
            assessment_type: req.assessment_type,
            exam_date: req.exam_date,
        },
    )?;
    Ok((StatusCode::CREATED, Json(assessment)))
}
