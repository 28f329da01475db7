//! Health and probe endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Detailed health report for operators and monitors.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseStatus,
    pub storage: StorageStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseStatus {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageStatus {
    pub available: bool,
}

/// One-word response for the probe endpoints.
#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
}

/// Full health check.
///
/// GET /health
///
/// Reports database connectivity with round-trip latency and whether
/// the file storage root is reachable. A lost database turns the whole
/// report into a 503; lost storage only degrades it, since most of the
/// API keeps working without uploads.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthReport>, StatusCode> {
    let start = std::time::Instant::now();
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    let storage_available = tokio::fs::metadata(state.storage.root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    if !db_connected {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthReport {
        status: if storage_available { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseStatus {
            connected: true,
            latency_ms: Some(latency_ms),
        },
        storage: StorageStatus {
            available: storage_available,
        },
    }))
}

/// Liveness probe. Answers as long as the process runs.
///
/// GET /health/live
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive" })
}

/// Readiness probe. Ready means the database answers.
///
/// GET /health/ready
pub async fn ready(State(state): State<AppState>) -> Result<Json<ProbeResponse>, StatusCode> {
    if sqlx::query("SELECT 1").execute(&state.pool).await.is_ok() {
        Ok(Json(ProbeResponse { status: "ready" }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report_serialization() {
        let report = HealthReport {
            status: "degraded",
            version: "1.0.0",
            database: DatabaseStatus {
                connected: true,
                latency_ms: Some(3),
            },
            storage: StorageStatus { available: false },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["database"]["latency_ms"], 3);
        assert_eq!(json["storage"]["available"], false);
    }
}
