use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::service::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// GET /health/live - Process liveness
pub async fn liveness() -> impl IntoResponse {
    Json(HealthResponse {
        status: "alive".to_string(),
        timestamp: chrono::Utc::now(),
        error: None,
    })
}

/// GET /health/ready - Readiness including storage connectivity
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready".to_string(),
                timestamp: chrono::Utc::now(),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "storage readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    timestamp: chrono::Utc::now(),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
