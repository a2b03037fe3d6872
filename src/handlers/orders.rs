use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::orders::{
    CreateOrderRequest, DispatchRequest, OrderFilter, OrderMetrics, OrderResponse,
    UpdateOrderDetails,
};
use crate::services::reconciliation::{ReconciliationOutcome, ReconciliationRequest};
use crate::{
    entities::order::OrderStatus, errors::ServiceError, ApiResponse, AppState, ListQuery,
    PaginatedResponse,
};

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
}

/// Resolve an order identifier that may be a UUID or an order_number string
async fn resolve_order_id(state: &AppState, id: &str) -> Result<Uuid, ServiceError> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }
    if let Some(uuid) = state
        .services
        .order
        .find_order_id_by_order_number(id)
        .await?
    {
        return Ok(uuid);
    }
    Err(ServiceError::NotFound(format!(
        "Order with ID {} not found",
        id
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "Get a paginated list of orders with optional status and customer filtering",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20)"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("customer_id" = Option<Uuid>, Query, description = "Filter by customer ID"),
    ),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<PaginatedResponse<OrderResponse>>),
        (status = 400, description = "Invalid request parameters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<OrderResponse>>>, ServiceError> {
    let filter = OrderFilter {
        status: params.status,
        customer_id: params.customer_id,
    };
    let result = state
        .services
        .order
        .list_orders(query.page, query.limit, filter)
        .await?;
    let total_pages = result.total.div_ceil(query.limit.max(1));
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items: result.orders,
        total: result.total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Create order",
    description = "Create a new order in status requested, accruing the customer receivable",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let order = state.services.order.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = String, Path, description = "Order ID (UUID) or order number")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order_id = resolve_order_id(&state, &id).await?;
    let order = state
        .services
        .order
        .get_order(order_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/by-number/{order_number}",
    summary = "Get order by number",
    params(("order_number" = String, Path, description = "Human-facing order number")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order_id = state
        .services
        .order
        .find_order_id_by_order_number(&order_number)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))?;
    let order = state
        .services
        .order
        .get_order(order_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    summary = "Update order",
    description = "Update document numbers, delivery address and trip costs",
    params(("id" = String, Path, description = "Order ID (UUID) or order number")),
    request_body = UpdateOrderDetails,
    responses(
        (status = 200, description = "Order updated successfully", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(details): Json<UpdateOrderDetails>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order_id = resolve_order_id(&state, &id).await?;
    let order = state.services.order.update_order(order_id, details).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    summary = "Delete order",
    description = "Delete an order and every record that references it",
    params(("id" = String, Path, description = "Order ID (UUID) or order number")),
    responses(
        (status = 200, description = "Order deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>, ServiceError> {
    let order_id = resolve_order_id(&state, &id).await?;
    state.services.order.delete_order(order_id).await?;
    Ok(Json(ApiResponse::success(format!(
        "Order {} deleted",
        order_id
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/metrics",
    summary = "Order pipeline metrics",
    responses(
        (status = 200, description = "Metrics retrieved successfully", body = ApiResponse<OrderMetrics>),
    )
)]
pub async fn order_metrics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OrderMetrics>>, ServiceError> {
    let metrics = state.services.order.order_metrics().await?;
    Ok(Json(ApiResponse::success(metrics)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/dispatch",
    summary = "Dispatch order",
    description = "Assign a truck and driver to a requested order after financial clearance",
    params(("id" = String, Path, description = "Order ID (UUID) or order number")),
    request_body = DispatchRequest,
    responses(
        (status = 200, description = "Order dispatched", body = ApiResponse<OrderResponse>),
        (status = 409, description = "Order already dispatched or truck already reserved", body = crate::errors::ErrorResponse),
        (status = 422, description = "Clearance or fleet precondition failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn dispatch_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ServiceError> {
    let order_id = resolve_order_id(&state, &id).await?;
    let order = state
        .services
        .order
        .dispatch_order(order_id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/reconcile",
    summary = "Reconcile delivery",
    description = "Close out a dispatched order against delivered quantities, gated by the delivery code",
    params(("id" = String, Path, description = "Order ID (UUID) or order number")),
    request_body = ReconciliationRequest,
    responses(
        (status = 200, description = "Delivery reconciled", body = ApiResponse<ReconciliationOutcome>),
        (status = 401, description = "Delivery code mismatch", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already reconciled", body = crate::errors::ErrorResponse),
    )
)]
pub async fn reconcile_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ReconciliationRequest>,
) -> Result<Json<ApiResponse<ReconciliationOutcome>>, ServiceError> {
    let order_id = resolve_order_id(&state, &id).await?;
    let outcome = state
        .services
        .reconciliation
        .submit(order_id, request)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
