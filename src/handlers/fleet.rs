use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::services::fleet::FleetPair;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/fleet/available",
    summary = "List available truck+driver pairs",
    description = "Active, compliant, paired and not currently reserved",
    responses(
        (status = 200, description = "Available pairs retrieved successfully", body = ApiResponse<Vec<FleetPair>>),
    )
)]
pub async fn available_pairs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FleetPair>>>, ServiceError> {
    let pairs = state.services.fleet.available_pairs().await?;
    Ok(Json(ApiResponse::success(pairs)))
}

#[utoipa::path(
    get,
    path = "/api/v1/fleet/busy",
    summary = "List busy truck IDs",
    description = "Trucks with an open reservation (dispatched, not yet reconciled)",
    responses(
        (status = 200, description = "Busy trucks retrieved successfully", body = ApiResponse<Vec<Uuid>>),
    )
)]
pub async fn busy_trucks(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Uuid>>>, ServiceError> {
    let ids = state.services.fleet.busy_truck_ids().await?;
    Ok(Json(ApiResponse::success(ids)))
}
