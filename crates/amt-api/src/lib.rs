//! # amt-api: HTTP Surface for the Assessment Workflow
//!
//! A thin Axum layer over [`amt_engine::WorkflowService`]. Handlers
//! resolve the caller, translate the request, and map errors; all
//! workflow decisions are made in the engine.
//!
//! ## API Surface
//!
//! | Prefix                        | Module                   |
//! |-------------------------------|--------------------------|
//! | `/v1/users/*`                 | [`routes::users`]        |
//! | `/v1/modules/*`               | [`routes::modules`]      |
//! | `/v1/assessments/*`           | [`routes::assessments`]  |
//! | `/v1/admin/assessments/*`     | [`routes::assessments`]  |
//! | `/health/*`                   | this module              |
//!
//! Caller identity comes from the `X-User-Id` header ([`auth`]).

pub mod auth;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health checks are mounted without the identity requirement.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::users::router())
        .merge(routes::modules::router())
        .merge(routes::assessments::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness check. Always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check.
async fn readiness() -> &'static str {
    "ready"
}
