//! REST endpoints for sign-in reconciliation and onboarding.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use super::manager::OnboardingManager;
use super::reconcile::Reconciler;
use crate::auth::{AuthState, Principal};
use crate::error::{OnboardingError, StoreError};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub reconciler: Arc<Reconciler>,
    pub manager: Arc<OnboardingManager>,
    pub auth: Arc<AuthState>,
}

#[derive(Debug, Deserialize)]
struct UsernameRequest {
    username: String,
}

#[derive(Debug, Deserialize)]
struct PhoneNumberRequest {
    phone_number: String,
}

fn error_response(err: &OnboardingError) -> Response {
    let status = match err {
        OnboardingError::Validation { .. } => StatusCode::BAD_REQUEST,
        OnboardingError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
        OnboardingError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
        OnboardingError::Store(StoreError::PermissionDenied { .. }) => StatusCode::FORBIDDEN,
        OnboardingError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        OnboardingError::Store(StoreError::Malformed { .. })
        | OnboardingError::Classification { .. }
        | OnboardingError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({
            "error": err.code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, OnboardingError>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Malformed or mistyped bodies render like any other validation error.
fn body_rejection(rejection: JsonRejection) -> Response {
    error_response(&OnboardingError::validation("body", rejection.body_text()))
}

async fn health() -> impl IntoResponse {
    "ok"
}

/// GET /api/auth/status
async fn auth_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.auth.snapshot())
}

/// POST /api/auth/reconcile
///
/// Body is the principal issued by the identity provider.
async fn reconcile(
    State(state): State<OnboardingRouteState>,
    body: Result<Json<Principal>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(principal)) => respond(state.reconciler.reconcile(&principal).await),
        Err(rejection) => body_rejection(rejection),
    }
}

/// POST /api/auth/sign-out
async fn sign_out(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.auth.sign_out();
    StatusCode::NO_CONTENT
}

/// GET /api/onboarding/{uid}/status
async fn onboarding_status(
    State(state): State<OnboardingRouteState>,
    Path(uid): Path<String>,
) -> Response {
    respond(state.manager.status(&uid).await)
}

/// POST /api/onboarding/{uid}/username
async fn set_username(
    State(state): State<OnboardingRouteState>,
    Path(uid): Path<String>,
    body: Result<Json<UsernameRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(body)) => respond(state.manager.set_username(&uid, &body.username).await),
        Err(rejection) => body_rejection(rejection),
    }
}

/// POST /api/onboarding/{uid}/phone
async fn set_phone_number(
    State(state): State<OnboardingRouteState>,
    Path(uid): Path<String>,
    body: Result<Json<PhoneNumberRequest>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(body)) => respond(state.manager.set_phone_number(&uid, &body.phone_number).await),
        Err(rejection) => body_rejection(rejection),
    }
}

/// Build the auth and onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/status", get(auth_status))
        .route("/api/auth/reconcile", post(reconcile))
        .route("/api/auth/sign-out", post(sign_out))
        .route("/api/onboarding/{uid}/status", get(onboarding_status))
        .route("/api/onboarding/{uid}/username", post(set_username))
        .route("/api/onboarding/{uid}/phone", post(set_phone_number))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
