use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use error_stack::Report;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use crate::dashboard::{self, Dashboard, DashboardRequest};
use crate::error::SnapshotError;

/// Builds the REST router with permissive CORS and shared state.
///
/// All endpoints live under `/api/v1/` and are read-only.
pub fn router(state: Arc<Dashboard>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/symbols", get(symbols))
        .route("/api/v1/controls", get(control_ranges))
        .route("/api/v1/dashboard", get(snapshot))
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

async fn symbols(State(dashboard): State<Arc<Dashboard>>) -> impl IntoResponse {
    Json(dashboard.symbol_names())
}

async fn control_ranges() -> impl IntoResponse {
    Json(dashboard::controls())
}

async fn snapshot(
    State(dashboard): State<Arc<Dashboard>>,
    Query(request): Query<DashboardRequest>,
) -> Response {
    match dashboard.build_snapshot(&request).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(report) => error_response(&report),
    }
}

/// One status code per failure class; the body always carries a single
/// `error` string.
fn error_response(report: &Report<SnapshotError>) -> Response {
    let status = match report.current_context() {
        SnapshotError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        SnapshotError::Symbol => StatusCode::NOT_FOUND,
        SnapshotError::Fetch => StatusCode::BAD_GATEWAY,
        SnapshotError::Indicator | SnapshotError::Forecast => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(?report, "snapshot request failed");
    } else {
        warn!(?report, "snapshot request rejected");
    }
    let body = json!({ "error": report.current_context().to_string() });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(error: SnapshotError) -> StatusCode {
        error_response(&Report::new(error)).status()
    }

    #[test]
    fn statuses_follow_failure_class() {
        assert_eq!(
            status_for(SnapshotError::InvalidRequest {
                reason: "ma_window must be between 5 and 50".into(),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(SnapshotError::Symbol), StatusCode::NOT_FOUND);
        assert_eq!(status_for(SnapshotError::Fetch), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(SnapshotError::Indicator),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(SnapshotError::Forecast),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn error_body_carries_a_message() {
        let response = error_response(&Report::new(SnapshotError::Symbol));
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["error"], "symbol resolution failed");
    }
}
