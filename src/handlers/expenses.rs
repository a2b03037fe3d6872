use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::entities::expense::Model as ExpenseModel;
use crate::entities::purchase::Model as PurchaseModel;
use crate::services::expenses::RecordExpenseRequest;
use crate::{errors::ServiceError, ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/expenses",
    summary = "List trip expenses for an order",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Expenses retrieved successfully", body = ApiResponse<Vec<ExpenseModel>>),
    )
)]
pub async fn list_order_expenses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ExpenseModel>>>, ServiceError> {
    let expenses = state.services.expenses.list_for_order(id).await?;
    Ok(Json(ApiResponse::success(expenses)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/expenses",
    summary = "Record a trip expense against an order",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = RecordExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = ApiResponse<ExpenseModel>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    )
)]
pub async fn record_order_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut request): Json<RecordExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseModel>>), ServiceError> {
    // The path is authoritative for the order link.
    request.order_id = Some(id);
    let expense = state.services.expenses.record(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(expense))))
}

#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}/purchases",
    summary = "List purchases from a supplier",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Purchases retrieved successfully", body = ApiResponse<Vec<PurchaseModel>>),
    )
)]
pub async fn list_supplier_purchases(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PurchaseModel>>>, ServiceError> {
    let purchases = state
        .services
        .expenses
        .list_purchases_for_supplier(id)
        .await?;
    Ok(Json(ApiResponse::success(purchases)))
}
