use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/health",
    summary = "Liveness probe",
    responses((status = 200, description = "Service is up", body = ApiResponse<Value>))
)]
pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    summary = "Readiness probe",
    description = "Pings the database",
    responses(
        (status = 200, description = "Service is ready", body = ApiResponse<Value>),
        (status = 500, description = "Database unreachable", body = crate::errors::ErrorResponse),
    )
)]
pub async fn readiness(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    crate::db::check_connection(&state.db).await?;
    Ok(Json(ApiResponse::success(json!({
        "status": "ready",
        "database": "ok",
    }))))
}
