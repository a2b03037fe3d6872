use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::entities::driver_transaction::Model as TransactionModel;
use crate::services::wallet::{RecordTransactionRequest, WalletBalance};
use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/drivers/{id}/wallet",
    summary = "List wallet transactions",
    params(("id" = Uuid, Path, description = "Driver ID")),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<Vec<TransactionModel>>),
        (status = 404, description = "Driver not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_wallet_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TransactionModel>>>, ServiceError> {
    let transactions = state.services.wallet.list(id).await?;
    Ok(Json(ApiResponse::success(transactions)))
}

#[utoipa::path(
    post,
    path = "/api/v1/drivers/{id}/wallet",
    summary = "Record wallet transaction",
    description = "Amount must be positive; the transaction type decides the sign at fold time",
    params(("id" = Uuid, Path, description = "Driver ID")),
    request_body = RecordTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = ApiResponse<TransactionModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Driver not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn record_wallet_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionModel>>), ServiceError> {
    let transaction = state.services.wallet.record(id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(transaction))))
}

#[utoipa::path(
    get,
    path = "/api/v1/drivers/{id}/wallet/balance",
    summary = "Get wallet balance",
    description = "The balance is always the fold of the full ledger",
    params(("id" = Uuid, Path, description = "Driver ID")),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = ApiResponse<WalletBalance>),
        (status = 404, description = "Driver not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn wallet_balance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WalletBalance>>, ServiceError> {
    let balance = state.services.wallet.balance(id).await?;
    Ok(Json(ApiResponse::success(balance)))
}
