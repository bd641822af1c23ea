//! HTTP API for the chat proxy.
//!
//! Routes:
//! - POST /api/chat/simple
//! - POST /api/chat/detailed
//! - GET /health

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::ChatClient;
use crate::config::Config;
use crate::prompt::ChatRequest;
use crate::server::error::ApiError;
use crate::server::health::HealthStatus;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<dyn ChatClient>,
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat/simple", post(simple_chat))
        .route("/api/chat/detailed", post(detailed_chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn simple_chat(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<String, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    info!(request_id, chars = body.chars().count(), "Simple chat request");

    let text = state.client.call_user(&body).await.map_err(|e| {
        warn!(request_id, error = %e, "Simple chat failed");
        ApiError::from(e)
    })?;

    info!(
        request_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Simple chat complete"
    );
    Ok(text)
}

async fn detailed_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    let Json(req) = payload.map_err(|rejection| {
        warn!(
            request_id,
            status = rejection.status().as_u16(),
            "Rejected detailed chat body: {}",
            rejection.body_text()
        );
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    })?;

    let prompt = req.into_prompt().map_err(|e| {
        warn!(request_id, error = %e, "Detailed chat validation failed");
        ApiError::from(e)
    })?;

    info!(
        request_id,
        messages = prompt.messages.len(),
        temperature = ?prompt.options.temperature,
        "Detailed chat request"
    );

    let completion = state.client.complete(&prompt).await.map_err(|e| {
        warn!(request_id, error = %e, "Detailed chat failed");
        ApiError::from(e)
    })?;

    info!(
        request_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        finish_reason = ?completion.finish_reason,
        total_tokens = ?completion.usage.map(|u| u.total_tokens),
        "Detailed chat complete"
    );
    Ok(completion.into_text())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus::from_config(&state.config.azure))
}
