//! REST endpoints for driving wizard sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::WizardError;

use super::controller::WizardController;
use super::state::{SessionState, WizardEvent};
use super::store::SessionStore;
use super::view::{View, render};

/// Shared state for wizard routes.
#[derive(Clone)]
pub struct WizardRouteState {
    pub store: Arc<SessionStore>,
    pub controller: Arc<WizardController>,
}

/// Body returned by every session endpoint.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub view: View,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    value: String,
}

/// Error wrapper mapping wizard errors to HTTP responses.
struct ApiError(WizardError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            WizardError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            WizardError::Config(_) | WizardError::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}

type ApiResult = Result<Json<SessionResponse>, ApiError>;

/// Build the wizard REST routes.
pub fn wizard_routes(store: Arc<SessionStore>, controller: Arc<WizardController>) -> Router {
    let state = WizardRouteState { store, controller };

    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/submit", post(submit))
        .route("/api/sessions/{id}/generate", post(generate))
        .route("/api/sessions/{id}/retry", post(retry))
        .route("/api/sessions/{id}/reset", post(reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(app): State<WizardRouteState>) -> impl IntoResponse {
    let generation = if app.controller.has_provider() {
        "ready"
    } else {
        "missing_api_key"
    };
    Json(serde_json::json!({
        "status": "ok",
        "service": "story-wizard",
        "generation": generation,
        "sessions": app.store.len().await
    }))
}

// ── Sessions ────────────────────────────────────────────────────────────

/// POST /api/sessions
async fn create_session(State(app): State<WizardRouteState>) -> impl IntoResponse {
    let (session_id, state) = app.store.create().await;
    let view = render(&state);
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            state,
            view,
        }),
    )
}

/// GET /api/sessions/{id}
///
/// A render cycle. If the session has just arrived at the generating step,
/// this is where the call gets made.
async fn get_session(State(app): State<WizardRouteState>, Path(id): Path<Uuid>) -> ApiResult {
    drive(&app, id).await
}

/// POST /api/sessions/{id}/submit
async fn submit(
    State(app): State<WizardRouteState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitBody>,
) -> ApiResult {
    apply(&app, id, WizardEvent::Submit { value: body.value }).await?;
    respond(&app, id, None).await
}

/// POST /api/sessions/{id}/generate
async fn generate(State(app): State<WizardRouteState>, Path(id): Path<Uuid>) -> ApiResult {
    drive(&app, id).await
}

/// POST /api/sessions/{id}/retry
async fn retry(State(app): State<WizardRouteState>, Path(id): Path<Uuid>) -> ApiResult {
    apply(&app, id, WizardEvent::Retry).await?;
    drive(&app, id).await
}

/// POST /api/sessions/{id}/reset
async fn reset(State(app): State<WizardRouteState>, Path(id): Path<Uuid>) -> ApiResult {
    apply(&app, id, WizardEvent::Reset).await?;
    respond(&app, id, None).await
}

// ── Helpers ─────────────────────────────────────────────────────────────

async fn apply(app: &WizardRouteState, id: Uuid, event: WizardEvent) -> Result<(), ApiError> {
    debug!(session_id = %id, event = ?event, "Applying wizard event");
    let controller = &app.controller;
    app.store
        .update(id, move |s| {
            controller.apply(s, event);
        })
        .await
        .ok_or(ApiError(WizardError::SessionNotFound(id)))
}

/// Run the pending generation for this session, if any, then respond.
///
/// The store lock is released while the provider call is outstanding.
async fn drive(app: &WizardRouteState, id: Uuid) -> ApiResult {
    let controller = &app.controller;
    let claimed = app
        .store
        .update(id, |s| controller.claim(s))
        .await
        .ok_or(ApiError(WizardError::SessionNotFound(id)))?;

    let banner = match claimed {
        Ok(Some(job)) => {
            let arrival = job.arrival;
            let result = controller.run(&job).await;
            // The failure message is recorded in the session state.
            let finished = app
                .store
                .update(id, move |s| controller.finish(s, arrival, result))
                .await
                .ok_or(ApiError(WizardError::SessionNotFound(id)))?;
            if let Err(e) = finished {
                warn!(session_id = %id, error = %e, "Generation failed");
            }
            None
        }
        Ok(None) => None,
        Err(config_error) => Some(WizardError::from(config_error).to_string()),
    };

    respond(app, id, banner).await
}

async fn respond(app: &WizardRouteState, id: Uuid, banner: Option<String>) -> ApiResult {
    let state = app
        .store
        .get(id)
        .await
        .ok_or(ApiError(WizardError::SessionNotFound(id)))?;
    let mut view = render(&state);
    if let Some(message) = banner {
        view = view.with_error(message);
    }
    Ok(Json(SessionResponse {
        session_id: id,
        state,
        view,
    }))
}
