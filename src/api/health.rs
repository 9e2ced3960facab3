//! Liveness and readiness endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthResponse {
    fn new(status: HealthStatus, latency_ms: Option<u64>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now().to_rfc3339(),
            latency_ms,
        }
    }
}

/// GET /api/health - the process is up
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse::new(HealthStatus::Healthy, None))
}

/// GET /api/ready - the store answers
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let result = state.user_service.ping().await;
    let latency = Some(start.elapsed().as_millis() as u64);

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse::new(HealthStatus::Healthy, latency)),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new(HealthStatus::Unhealthy, latency)),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_string(&HealthResponse::new(HealthStatus::Healthy, None)).unwrap();

        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"timestamp\""));
        assert!(!json.contains("latency_ms"));
    }
}
