use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::payment::{Model as PaymentModel, PaymentStatus};
use crate::services::payments::{CreatePaymentRequest, PaymentFilter};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct PaymentListParams {
    pub customer_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResolvePaymentRequest {
    /// `Confirmed` or `Rejected`
    pub resolution: PaymentStatus,
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    summary = "List payments",
    params(
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "Payments retrieved successfully", body = ApiResponse<Vec<PaymentModel>>),
    )
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Query(params): Query<PaymentListParams>,
) -> Result<Json<ApiResponse<Vec<PaymentModel>>>, ServiceError> {
    let payments = state
        .services
        .payments
        .list_payments(PaymentFilter {
            customer_id: params.customer_id,
            status: params.status,
        })
        .await?;
    Ok(Json(ApiResponse::success(payments)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    summary = "Record payment",
    description = "Cash and POS payments confirm immediately; transfer and cheque stay pending",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentModel>>), ServiceError> {
    let payment = state.services.payments.create_payment(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    summary = "Get payment",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment retrieved successfully", body = ApiResponse<PaymentModel>),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PaymentModel>>, ServiceError> {
    let payment = state.services.payments.get_payment(id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/confirm",
    summary = "Resolve pending payment",
    description = "Confirm settles the payment against the customer balance; reject leaves it untouched",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = ResolvePaymentRequest,
    responses(
        (status = 200, description = "Payment resolved", body = ApiResponse<PaymentModel>),
        (status = 409, description = "Payment is not pending", body = crate::errors::ErrorResponse),
    )
)]
pub async fn resolve_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolvePaymentRequest>,
) -> Result<Json<ApiResponse<PaymentModel>>, ServiceError> {
    let payment = state
        .services
        .payments
        .resolve_payment(id, request.resolution)
        .await?;
    Ok(Json(ApiResponse::success(payment)))
}
