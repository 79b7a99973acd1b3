use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::Employee;
use super::service::{HiringService, HiringServiceError};

/// Router builder exposing the pipeline and intake operations.
pub fn hiring_router(service: Arc<HiringService>) -> Router {
    Router::new()
        .route("/api/v1/hiring/pipeline", post(pipeline_handler))
        .route("/api/v1/hiring/intake", post(intake_handler))
        .route("/api/v1/hiring/requirements", get(requirements_handler))
        .with_state(service)
}

pub(crate) async fn pipeline_handler(
    State(service): State<Arc<HiringService>>,
    axum::Json(employee): axum::Json<Employee>,
) -> Response {
    match service.run_pipeline(employee).await {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(HiringServiceError::InvalidEmployee(reason)) => {
            let payload = json!({
                "error": reason,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn intake_handler(State(service): State<Arc<HiringService>>) -> Response {
    let report = service.run_intake_once().await;
    let status = if report.fetch_error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    (status, axum::Json(report)).into_response()
}

pub(crate) async fn requirements_handler(State(service): State<Arc<HiringService>>) -> Response {
    let (requirements, source) = service.current_requirements();
    let payload = json!({
        "source": source,
        "requirements": requirements,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
