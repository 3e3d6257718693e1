//! # Assessment Workflow API
//!
//! Reads (view, allowed targets, audit trail), state changes (progress and
//! admin override), assessment role assignment, setter content, and the
//! exam review records.
//!
//! Every state change goes through the engine's transition executor;
//! handlers only translate between HTTP and the service.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use amt_core::{AssessmentId, UserId};
use amt_engine::{
    AssessmentView, ContentSubmission, ExternalFeedback, RoleHolder, SetterResponse, TransitionRequest,
};
use amt_workflow::{Assessment, AssessmentRole, AssessmentState, Transition};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{check_len, check_present, extract_json, extract_validated_json, Validate};
use crate::state::AppState;

const MAX_NOTE_LEN: usize = 2_000;

/// Body of progress and override requests.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub target_state: AssessmentState,
    pub note: Option<String>,
    /// Fail with 409 unless the assessment is still at this version.
    pub expected_version: Option<u64>,
}

impl Validate for TransitionBody {
    fn validate(&self) -> Result<(), String> {
        match &self.note {
            Some(note) => check_len("note", note, MAX_NOTE_LEN),
            None => Ok(()),
        }
    }
}

impl TransitionBody {
    fn into_request(self, id: AssessmentId) -> TransitionRequest {
        TransitionRequest {
            assessment_id: id,
            target: self.target_state,
            note: self.note,
            expected_version: self.expected_version,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllowedTargetsResponse {
    pub assessment_id: AssessmentId,
    pub current_state: AssessmentState,
    pub allowed_targets: Vec<AssessmentState>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: UserId,
    pub role: AssessmentRole,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentRequest {
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

impl Validate for FeedbackRequest {
    fn validate(&self) -> Result<(), String> {
        check_present("feedback", &self.feedback)
    }
}

#[derive(Debug, Deserialize)]
pub struct SetterResponseRequest {
    pub response: String,
    pub document_ref: Option<String>,
}

impl Validate for SetterResponseRequest {
    fn validate(&self) -> Result<(), String> {
        check_present("response", &self.response)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/assessments", get(list_assessments))
        .route("/v1/assessments/{id}", get(get_assessment))
        .route("/v1/assessments/{id}/allowed-targets", get(allowed_targets))
        .route("/v1/assessments/{id}/progress", post(progress))
        .route("/v1/admin/assessments/{id}/override", post(override_transition))
        .route("/v1/assessments/{id}/roles", get(list_roles).post(assign_role))
        .route("/v1/assessments/{id}/roles/{user_id}/{role}", delete(remove_role))
        .route("/v1/assessments/{id}/transitions", get(list_transitions))
        .route("/v1/assessments/{id}/content", post(submit_content))
        .route(
            "/v1/assessments/{id}/external-feedback",
            get(external_feedback).post(submit_external_feedback),
        )
        .route(
            "/v1/assessments/{id}/setter-response",
            get(setter_response).post(submit_setter_response),
        )
}

/// GET /v1/assessments
///
/// Assessments visible to the caller.
async fn list_assessments(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Assessment>>, AppError> {
    Ok(Json(state.service.assessments_visible_to(&caller.id())?))
}

/// GET /v1/assessments/{id}
async fn get_assessment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
) -> Result<Json<AssessmentView>, AppError> {
    Ok(Json(state.service.get_assessment_view(&id, &caller.id())?))
}

/// GET /v1/assessments/{id}/allowed-targets
async fn allowed_targets(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
) -> Result<Json<AllowedTargetsResponse>, AppError> {
    let (assessment, allowed_targets) = state.service.assessment_with_targets(&id, &caller.id())?;
    Ok(Json(AllowedTargetsResponse {
        assessment_id: id,
        current_state: assessment.state,
        allowed_targets,
    }))
}

/// POST /v1/assessments/{id}/progress
async fn progress(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
    body: Result<Json<TransitionBody>, JsonRejection>,
) -> Result<Json<Assessment>, AppError> {
    let req = extract_validated_json(body)?;
    let updated = state.service.progress(&caller.id(), req.into_request(id))?;
    Ok(Json(updated))
}

/// POST /v1/admin/assessments/{id}/override
///
/// Teaching support and exams officers.
async fn override_transition(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
    body: Result<Json<TransitionBody>, JsonRejection>,
) -> Result<Json<Assessment>, AppError> {
    caller.require_manager()?;
    let req = extract_validated_json(body)?;
    let updated = state
        .service
        .override_transition(&caller.id(), req.into_request(id))?;
    Ok(Json(updated))
}

/// POST /v1/assessments/{id}/roles
async fn assign_role(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
    body: Result<Json<AssignRoleRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    let req = extract_json(body)?;
    state.service.assign_role(&id, &req.user_id, req.role)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/assessments/{id}/roles
async fn list_roles(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
) -> Result<Json<Vec<RoleHolder>>, AppError> {
    Ok(Json(state.service.assessment_roles(&id)?))
}

/// DELETE /v1/assessments/{id}/roles/{user_id}/{role}
async fn remove_role(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, user_id, role)): Path<(AssessmentId, UserId, String)>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    let role: AssessmentRole = role.parse()?;
    state.service.remove_role(&id, &user_id, role)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/assessments/{id}/transitions
///
/// Most recent first.
async fn list_transitions(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
) -> Result<Json<Vec<Transition>>, AppError> {
    Ok(Json(state.service.list_transitions(&id)?))
}

/// POST /v1/assessments/{id}/content
///
/// Setter attaches content to a draft.
async fn submit_content(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<Assessment>, AppError> {
    let req = extract_json(body)?;
    let updated = state.service.submit_content(
        &id,
        &caller.id(),
        ContentSubmission {
            description: req.description,
            file_name: req.file_name,
            file_url: req.file_url,
        },
    )?;
    Ok(Json(updated))
}

/// POST /v1/assessments/{id}/external-feedback
async fn submit_external_feedback(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExternalFeedback>), AppError> {
    let req = extract_validated_json(body)?;
    let record = state
        .service
        .submit_external_feedback(&id, &caller.id(), &req.feedback)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/assessments/{id}/setter-response
async fn submit_setter_response(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
    body: Result<Json<SetterResponseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SetterResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let record = state.service.submit_setter_response(
        &id,
        &caller.id(),
        &req.response,
        req.document_ref,
    )?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/assessments/{id}/external-feedback
///
/// 404 until the examiner has submitted.
async fn external_feedback(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
) -> Result<Json<ExternalFeedback>, AppError> {
    Ok(Json(state.service.external_feedback(&id)?))
}

/// GET /v1/assessments/{id}/setter-response
async fn setter_response(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<AssessmentId>,
) -> Result<Json<SetterResponse>, AppError> {
    Ok(Json(state.service.setter_response(&id)?))
}
