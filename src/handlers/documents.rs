use axum::{
    extract::{Path, State},
    response::Html,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{
    customer::Entity as CustomerEntity,
    driver::Entity as DriverEntity,
    order::{self, Entity as OrderEntity, Model as OrderModel},
    payment::{self, Entity as PaymentEntity},
    truck::Entity as TruckEntity,
};
use crate::services::documents;
use crate::{errors::ServiceError, AppState};

async fn load_order(state: &AppState, id: Uuid) -> Result<OrderModel, ServiceError> {
    OrderEntity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
}

/// Loads the truck and driver assigned to a dispatched order. Orders that
/// were never dispatched have no haulage documents.
async fn load_assignment(
    state: &AppState,
    order: &OrderModel,
) -> Result<
    (
        crate::entities::truck::Model,
        crate::entities::driver::Model,
    ),
    ServiceError,
> {
    let truck_id = order.truck_id.ok_or_else(|| {
        ServiceError::PreconditionFailed(format!(
            "Order {} has no truck assigned yet",
            order.order_number
        ))
    })?;
    let driver_id = order.driver_id.ok_or_else(|| {
        ServiceError::PreconditionFailed(format!(
            "Order {} has no driver assigned yet",
            order.order_number
        ))
    })?;

    let truck = TruckEntity::find_by_id(truck_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Truck {} not found", truck_id)))?;
    let driver = DriverEntity::find_by_id(driver_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Driver {} not found", driver_id)))?;

    Ok((truck, driver))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/documents/{kind}",
    summary = "Render order document",
    description = "Renders a printable HTML document: waybill, gate-pass, loading-manifest or invoice",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("kind" = String, Path, description = "Document kind"),
    ),
    responses(
        (status = 200, description = "HTML document", content_type = "text/html", body = String),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Order has no truck/driver assigned", body = crate::errors::ErrorResponse),
    )
)]
pub async fn order_document(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
) -> Result<Html<String>, ServiceError> {
    let order = load_order(&state, id).await?;
    let customer = CustomerEntity::find_by_id(order.customer_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Customer {} not found", order.customer_id))
        })?;

    let html = match kind.as_str() {
        "invoice" => documents::invoice(&order, &customer),
        "waybill" => {
            let (truck, driver) = load_assignment(&state, &order).await?;
            documents::waybill(&order, &customer, &truck, &driver)
        }
        "gate-pass" => {
            let (truck, driver) = load_assignment(&state, &order).await?;
            documents::gate_pass(&order, &customer, &truck, &driver)
        }
        "loading-manifest" => {
            let (truck, driver) = load_assignment(&state, &order).await?;
            documents::loading_manifest(&order, &customer, &truck, &driver)
        }
        other => {
            return Err(ServiceError::ValidationError(format!(
                "Unknown document kind: {}",
                other
            )));
        }
    };

    Ok(Html(html))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}/receipt",
    summary = "Render payment receipt",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "HTML receipt", content_type = "text/html", body = String),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn payment_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ServiceError> {
    let payment = PaymentEntity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", id)))?;
    let customer = CustomerEntity::find_by_id(payment.customer_id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Customer {} not found", payment.customer_id))
        })?;

    Ok(Html(documents::receipt(&payment, &customer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/statement",
    summary = "Render statement of account",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "HTML statement", content_type = "text/html", body = String),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn customer_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ServiceError> {
    let customer = CustomerEntity::find_by_id(id)
        .one(&*state.db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))?;

    let orders = OrderEntity::find()
        .filter(order::Column::CustomerId.eq(id))
        .order_by_asc(order::Column::CreatedAt)
        .all(&*state.db)
        .await?;
    let payments = PaymentEntity::find()
        .filter(payment::Column::CustomerId.eq(id))
        .order_by_asc(payment::Column::CreatedAt)
        .all(&*state.db)
        .await?;

    Ok(Html(documents::statement_of_account(
        &customer, &orders, &payments,
    )))
}
