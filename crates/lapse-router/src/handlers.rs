//! HTTP request handlers for the Router service.
//!
//! Exposes the TTL status query and a health check using axum.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router as AxumRouter,
};
use lapse_janitor::{JanitorError, JanitorMetrics, MetricsSnapshot, StatusQuery};
use lapse_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use lapse_janitor::TtlResponse;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Expiry state, or the reason expiry is disabled
    pub expiry: Result<ExpiryState, String>,
}

/// Handles into a running expiry pipeline
#[derive(Clone)]
pub struct ExpiryState {
    /// TTL lookups against the document store
    pub status: StatusQuery<SqliteStore>,
    /// Sweep counters
    pub metrics: Arc<JanitorMetrics>,
}

impl AppState {
    /// State for a router whose expiry feature is configured
    pub fn enabled(status: StatusQuery<SqliteStore>, metrics: Arc<JanitorMetrics>) -> Self {
        Self {
            expiry: Ok(ExpiryState { status, metrics }),
        }
    }

    /// State for a router whose expiry feature failed to configure
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            expiry: Err(reason.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// "enabled" or "disabled"
    pub status: String,
    /// Why expiry is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Sweep counters when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Expiry is not configured
    Disabled(String),
    /// Store lookup failed
    Status(JanitorError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Disabled(reason) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Document expiry is disabled: {}", reason),
            ),
            AppError::Status(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], body).into_response()
    }
}

impl From<JanitorError> for AppError {
    fn from(e: JanitorError) -> Self {
        AppError::Status(e)
    }
}

/// GET /ttl/:document_id - Remaining lifetime of a document
async fn document_ttl(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Response, AppError> {
    let expiry = state.expiry.map_err(AppError::Disabled)?;

    let result = expiry.status.query(&document_id).await.map_err(|e| {
        tracing::warn!("TTL lookup for {} failed: {}", document_id, e);
        AppError::from(e)
    })?;

    let body = TtlResponse::from(result);
    Ok(([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(body)).into_response())
}

/// GET /health - Expiry status and sweep counters
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let response = match &state.expiry {
        Ok(expiry) => HealthCheckResponse {
            status: "enabled".to_string(),
            reason: None,
            metrics: Some(expiry.metrics.snapshot()),
        },
        Err(reason) => HealthCheckResponse {
            status: "disabled".to_string(),
            reason: Some(reason.clone()),
            metrics: None,
        },
    };

    Json(response)
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/ttl/:document_id", get(document_ttl))
        .route("/health", get(health_check))
        .with_state(state)
}
