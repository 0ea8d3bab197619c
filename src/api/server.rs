//! HTTP API server for the feedback service
//!
//! Handlers are stateless: each one validates its input, delegates to the
//! storage handle held in [`AppState`], and shapes a JSON response.
//! Validation failures surface their reason verbatim in a 400 body;
//! storage failures are logged and converted to generic 500 bodies so
//! internal detail never reaches the client.

use crate::config::ServerConfig;
use crate::error::Result;
use crate::storage::FeedbackStore;
use crate::validate::validate_submission;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

/// Shared handler state
///
/// The storage handle is constructed explicitly in `main` and injected
/// here; handlers hold no other mutable state and may run concurrently
/// without additional locking.
#[derive(Clone)]
pub struct AppState {
    /// Feedback store handle
    pub store: Arc<dyn FeedbackStore>,
}

impl AppState {
    /// Create handler state around a storage handle
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }
}

/// API server
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a new API server around a storage handle
    pub fn new(config: ServerConfig, store: Arc<dyn FeedbackStore>) -> Self {
        Self {
            config,
            state: AppState::new(store),
        }
    }

    /// Bind the configured address and serve until the process exits
    pub async fn serve(self) -> Result<()> {
        let router = build_router(self.state).layer(TimeoutLayer::new(self.config.request_timeout));

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        info!("API server listening on http://{}", self.config.addr);
        info!("Dashboard: pheme-dash --api http://{}", self.config.addr);

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Build the API router
///
/// CORS is permissive: the browser form and the dashboard are served from
/// other origins.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/feedback", post(submit_handler))
        .route("/api/feedback", get(list_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Submit feedback handler
///
/// The body is taken as raw JSON so the validator sees missing and
/// wrong-typed fields itself and can report one specific reason.
async fn submit_handler(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let feedback = match validate_submission(&payload) {
        Ok(feedback) => feedback,
        Err(reason) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": reason.to_string() })),
            )
                .into_response();
        }
    };

    match state.store.insert(&feedback).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Feedback submitted successfully",
                "feedback": record,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to store feedback: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to submit feedback" })),
            )
                .into_response()
        }
    }
}

/// List feedback handler (newest first)
async fn list_handler(State(state): State<AppState>) -> Response {
    match state.store.list_all().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            error!("Failed to list feedback: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch feedback" })),
            )
                .into_response()
        }
    }
}

/// Stats handler
async fn stats_handler(State(state): State<AppState>) -> Response {
    match state.store.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Failed to compute stats: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch statistics" })),
            )
                .into_response()
        }
    }
}

/// Health check handler
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health_handler().await;
        assert_eq!(response.0["status"], "OK");
        assert_eq!(response.0["message"], "Server is running");
    }
}
