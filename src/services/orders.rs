use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::credit_note,
    entities::customer::{ActiveModel as CustomerActiveModel, Entity as CustomerEntity},
    entities::depot::Entity as DepotEntity,
    entities::depot_stock::{self, Entity as DepotStockEntity},
    entities::driver_transaction,
    entities::expense,
    entities::fleet_reservation,
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
        OrderStatus, OrderType, QuantityUnit,
    },
    entities::payment::{self, PaymentStatus},
    entities::purchase::{self, ActiveModel as PurchaseActiveModel, Entity as PurchaseEntity},
    entities::shortage,
    errors::ServiceError,
    events::{Event, EventSender},
    services::customers::is_financially_cleared,
    services::fleet::FleetService,
};

/// Request/Response types for the order service
#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    #[validate(length(min = 1, message = "Cement type is required"))]
    pub cement_type: String,
    pub quantity: Decimal,
    pub unit: QuantityUnit,
    pub customer_id: Uuid,
    pub depot_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub fuel_cost: Option<Decimal>,
    pub driver_allowance: Option<Decimal>,
    pub other_trip_costs: Option<Decimal>,
    pub payment_terms: Option<String>,
    pub delivery_address: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderDetails {
    pub delivery_address: Option<String>,
    pub waybill_number: Option<String>,
    pub gate_pass_number: Option<String>,
    pub loading_manifest_number: Option<String>,
    pub atc_number: Option<String>,
    pub cap_number: Option<String>,
    pub other_trip_costs: Option<Decimal>,
    pub payment_terms: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct DispatchRequest {
    pub truck_id: Uuid,
    pub driver_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub order_type: OrderType,
    pub cement_type: String,
    pub quantity: Decimal,
    pub unit: QuantityUnit,
    pub customer_id: Uuid,
    pub depot_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub status: OrderStatus,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub total_purchase: Decimal,
    pub total_amount: Decimal,
    pub cement_profit: Decimal,
    pub margin_percent: Decimal,
    pub fuel_cost: Decimal,
    pub driver_allowance: Decimal,
    pub other_trip_costs: Decimal,
    pub total_trip_cost: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_terms: Option<String>,
    pub delivery_otp: Option<String>,
    pub delivery_address: Option<String>,
    pub waybill_number: Option<String>,
    pub gate_pass_number: Option<String>,
    pub loading_manifest_number: Option<String>,
    pub atc_number: Option<String>,
    pub cap_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderMetrics {
    pub counts_by_status: Vec<StatusCount>,
    pub busy_truck_ids: Vec<Uuid>,
}

#[derive(Debug, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
}

/// Drives an order through its status pipeline, enforcing the gates unique
/// to each transition. Every mutation is a single database transaction; the
/// receivable and depot stock move inside the same transaction as the
/// status write rather than behind a trigger.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    fleet: FleetService,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        fleet: FleetService,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            fleet,
            event_sender,
        }
    }

    /// Creates a new order in status `requested`, accrues the customer
    /// receivable, and records the linked purchase for plant-direct flows.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }
        if request.order_type == OrderType::PlantDirect && request.supplier_id.is_none() {
            return Err(ServiceError::ValidationError(
                "Plant-direct orders require a supplier".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = db.begin().await?;

        let customer = CustomerEntity::find_by_id(request.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Customer {} not found",
                    request.customer_id
                ))
            })?;

        DepotEntity::find_by_id(request.depot_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Depot {} not found", request.depot_id))
            })?;

        let total_purchase = request.quantity * request.purchase_price;
        let total_amount = request.quantity * request.sale_price;
        let cement_profit = total_amount - total_purchase;
        let margin_percent = if total_purchase > Decimal::ZERO {
            cement_profit / total_purchase * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        let fuel_cost = request.fuel_cost.unwrap_or(Decimal::ZERO);
        let driver_allowance = request.driver_allowance.unwrap_or(Decimal::ZERO);
        let other_trip_costs = request.other_trip_costs.unwrap_or(Decimal::ZERO);

        let order_active_model = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(generate_order_number()),
            order_type: Set(request.order_type),
            cement_type: Set(request.cement_type.clone()),
            quantity: Set(request.quantity),
            unit: Set(request.unit),
            customer_id: Set(request.customer_id),
            depot_id: Set(request.depot_id),
            supplier_id: Set(request.supplier_id),
            truck_id: Set(None),
            driver_id: Set(None),
            status: Set(OrderStatus::Requested),
            purchase_price: Set(request.purchase_price),
            sale_price: Set(request.sale_price),
            total_purchase: Set(total_purchase),
            total_amount: Set(total_amount),
            cement_profit: Set(cement_profit),
            margin_percent: Set(margin_percent),
            fuel_cost: Set(fuel_cost),
            driver_allowance: Set(driver_allowance),
            other_trip_costs: Set(other_trip_costs),
            total_trip_cost: Set(fuel_cost + driver_allowance + other_trip_costs),
            payment_status: Set(PaymentStatus::Pending),
            payment_terms: Set(request.payment_terms),
            delivery_otp: Set(None),
            delivery_address: Set(request.delivery_address),
            waybill_number: Set(None),
            gate_pass_number: Set(None),
            loading_manifest_number: Set(None),
            atc_number: Set(None),
            cap_number: Set(None),
            created_at: Set(now),
            updated_at: Set(None),
            version: Set(1),
        };

        let order_model = order_active_model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        // Accrue the receivable in the same transaction as the order write.
        let balance = customer.current_balance;
        let mut customer_active: CustomerActiveModel = customer.into();
        customer_active.current_balance = Set(balance + total_amount);
        customer_active.updated_at = Set(Some(now));
        customer_active.update(&txn).await?;

        if let (OrderType::PlantDirect, Some(supplier_id)) =
            (request.order_type, request.supplier_id)
        {
            let purchase = PurchaseActiveModel {
                id: Set(Uuid::new_v4()),
                supplier_id: Set(supplier_id),
                order_id: Set(Some(order_id)),
                cement_type: Set(request.cement_type),
                quantity: Set(request.quantity),
                unit_cost: Set(request.purchase_price),
                total_cost: Set(total_purchase),
                created_at: Set(now),
            };
            purchase.insert(&txn).await?;
        }

        txn.commit().await?;

        info!(order_id = %order_id, order_number = %order_model.order_number, "Order created");
        metrics::counter!("cemflow_orders.created", 1);

        self.emit(Event::OrderCreated(order_id)).await;

        Ok(model_to_response(order_model))
    }

    /// Retrieves an order by ID
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderResponse>, ServiceError> {
        let order = OrderEntity::find_by_id(order_id).one(&*self.db_pool).await?;
        Ok(order.map(model_to_response))
    }

    pub async fn find_order_id_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Uuid>, ServiceError> {
        let order = OrderEntity::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(&*self.db_pool)
            .await?;
        Ok(order.map(|o| o.id))
    }

    /// Lists orders with pagination and optional status/customer filters
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        filter: OrderFilter,
    ) -> Result<OrderListResponse, ServiceError> {
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);

        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(OrderListResponse {
            orders: orders.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Updates document numbers, delivery address and trip costs.
    #[instrument(skip(self, details), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        details: UpdateOrderDetails,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let fuel_cost = order.fuel_cost;
        let driver_allowance = order.driver_allowance;
        let version = order.version;

        let mut active: OrderActiveModel = order.into();
        if let Some(address) = details.delivery_address {
            active.delivery_address = Set(Some(address));
        }
        if let Some(waybill) = details.waybill_number {
            active.waybill_number = Set(Some(waybill));
        }
        if let Some(gate_pass) = details.gate_pass_number {
            active.gate_pass_number = Set(Some(gate_pass));
        }
        if let Some(manifest) = details.loading_manifest_number {
            active.loading_manifest_number = Set(Some(manifest));
        }
        if let Some(atc) = details.atc_number {
            active.atc_number = Set(Some(atc));
        }
        if let Some(cap) = details.cap_number {
            active.cap_number = Set(Some(cap));
        }
        if let Some(other_costs) = details.other_trip_costs {
            active.other_trip_costs = Set(other_costs);
            active.total_trip_cost = Set(fuel_cost + driver_allowance + other_costs);
        }
        if let Some(terms) = details.payment_terms {
            active.payment_terms = Set(Some(terms));
        }
        active.updated_at = Set(Some(now));
        active.version = Set(version + 1);

        let updated = active.update(db).await?;

        self.emit(Event::OrderUpdated(order_id)).await;

        Ok(model_to_response(updated))
    }

    /// The `requested` -> `dispatched` transition: financial clearance,
    /// fleet eligibility, atomic truck reservation, depot stock deduction,
    /// OTP generation and cost defaulting, all in one transaction.
    #[instrument(skip(self, request), fields(order_id = %order_id, truck_id = %request.truck_id))]
    pub async fn dispatch_order(
        &self,
        order_id: Uuid,
        request: DispatchRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        match order.status {
            OrderStatus::Requested => {}
            OrderStatus::Dispatched | OrderStatus::Delivered => {
                return Err(ServiceError::Conflict(format!(
                    "Order {} is already {}",
                    order.order_number, order.status
                )));
            }
            other => {
                return Err(ServiceError::InvalidStatus(format!(
                    "Order {} cannot be dispatched from status {}",
                    order.order_number, other
                )));
            }
        }

        // Financial clearance. A missing customer row fails closed: no
        // record means no credit standing to dispatch against.
        let customer = CustomerEntity::find_by_id(order.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Dispatch blocked: customer record missing");
                ServiceError::PreconditionFailed(
                    "Customer record not found; dispatch requires a known credit standing"
                        .to_string(),
                )
            })?;

        if customer.blocked {
            return Err(ServiceError::PreconditionFailed(format!(
                "Customer {} is blocked",
                customer.name
            )));
        }
        if !is_financially_cleared(&order, &customer) {
            return Err(ServiceError::PreconditionFailed(format!(
                "Financial clearance failed: balance {} plus order total {} exceeds credit limit {}",
                customer.current_balance, order.total_amount, customer.credit_limit
            )));
        }

        let (truck, driver) = self
            .fleet
            .check_pair(&txn, request.truck_id, request.driver_id)
            .await?;

        // Atomic reservation: a concurrent dispatch for the same truck
        // fails here with a Conflict instead of double-booking.
        self.fleet.reserve(&txn, truck.id, order_id).await?;

        if order.order_type == OrderType::DepotDispatch {
            deduct_depot_stock(&txn, order.depot_id, &order.cement_type, order.quantity).await?;
        }

        let otp = generate_otp();
        let fuel_cost = if order.fuel_cost > Decimal::ZERO {
            order.fuel_cost
        } else {
            truck.default_fuel_cost
        };
        let driver_allowance = if order.driver_allowance > Decimal::ZERO {
            order.driver_allowance
        } else {
            driver.trip_allowance
        };
        let total_trip_cost = fuel_cost + driver_allowance + order.other_trip_costs;

        // Compare-and-swap on (id, status, version): if another transaction
        // already moved this order, zero rows match and we bail out.
        let result = OrderEntity::update_many()
            .col_expr(order::Column::TruckId, Expr::value(Some(truck.id)))
            .col_expr(order::Column::DriverId, Expr::value(Some(driver.id)))
            .col_expr(order::Column::DeliveryOtp, Expr::value(Some(otp.clone())))
            .col_expr(order::Column::FuelCost, Expr::value(fuel_cost))
            .col_expr(order::Column::DriverAllowance, Expr::value(driver_allowance))
            .col_expr(order::Column::TotalTripCost, Expr::value(total_trip_cost))
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Dispatched))
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(now)))
            .col_expr(order::Column::Version, Expr::value(order.version + 1))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(OrderStatus::Requested))
            .filter(order::Column::Version.eq(order.version))
            .exec(&txn)
            .await?;

        if result.rows_affected != 1 {
            return Err(ServiceError::ConcurrentModification(order_id));
        }

        let updated = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            truck = %truck.plate_number,
            driver = %driver.name,
            "Order dispatched"
        );
        metrics::counter!("cemflow_orders.dispatched", 1);

        self.emit(Event::OrderDispatched {
            order_id,
            truck_id: truck.id,
            driver_id: driver.id,
        })
        .await;
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status: OrderStatus::Requested,
            new_status: OrderStatus::Dispatched,
        })
        .await;

        Ok(model_to_response(updated))
    }

    /// Deletes an order and everything that references it, reversing the
    /// receivable it accrued. Admin-only in the UI; here it is just the
    /// cascade.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        expense::Entity::delete_many()
            .filter(expense::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        payment::Entity::delete_many()
            .filter(payment::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        shortage::Entity::delete_many()
            .filter(shortage::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        driver_transaction::Entity::delete_many()
            .filter(driver_transaction::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        credit_note::Entity::delete_many()
            .filter(credit_note::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        fleet_reservation::Entity::delete_many()
            .filter(fleet_reservation::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;

        if order.order_type == OrderType::PlantDirect {
            PurchaseEntity::delete_many()
                .filter(purchase::Column::OrderId.eq(order_id))
                .exec(&txn)
                .await?;
        }

        // Reverse the receivable accrued at creation.
        if let Some(customer) = CustomerEntity::find_by_id(order.customer_id).one(&txn).await? {
            let balance = customer.current_balance;
            let mut active: CustomerActiveModel = customer.into();
            active.current_balance = Set(balance - order.total_amount);
            active.updated_at = Set(Some(Utc::now()));
            active.update(&txn).await?;
        }

        OrderEntity::delete_by_id(order_id).exec(&txn).await?;

        txn.commit().await?;

        info!(order_id = %order_id, "Order deleted with cascade");
        self.emit(Event::OrderDeleted(order_id)).await;

        Ok(())
    }

    /// Pipeline counts plus the busy truck set, for the dispatch board.
    pub async fn order_metrics(&self) -> Result<OrderMetrics, ServiceError> {
        let db = &*self.db_pool;

        let mut counts_by_status = Vec::new();
        for status in [
            OrderStatus::Requested,
            OrderStatus::InGate,
            OrderStatus::Loaded,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
        ] {
            let count = OrderEntity::find()
                .filter(order::Column::Status.eq(status))
                .count(db)
                .await?;
            counts_by_status.push(StatusCount { status, count });
        }

        let busy_truck_ids = self.fleet.busy_truck_ids().await?;

        Ok(OrderMetrics {
            counts_by_status,
            busy_truck_ids,
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

/// Decrements depot stock for a dispatch, inside the caller's transaction.
async fn deduct_depot_stock<C: sea_orm::ConnectionTrait>(
    conn: &C,
    depot_id: Uuid,
    cement_type: &str,
    quantity: Decimal,
) -> Result<(), ServiceError> {
    let stock = DepotStockEntity::find()
        .filter(depot_stock::Column::DepotId.eq(depot_id))
        .filter(depot_stock::Column::CementType.eq(cement_type))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InsufficientStock(format!(
                "Depot has no stock of {}",
                cement_type
            ))
        })?;

    if stock.quantity < quantity {
        return Err(ServiceError::InsufficientStock(format!(
            "Depot stock of {} is {}, order needs {}",
            cement_type, stock.quantity, quantity
        )));
    }

    let remaining = stock.quantity - quantity;
    let mut active: depot_stock::ActiveModel = stock.into();
    active.quantity = Set(remaining);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await?;

    Ok(())
}

/// 6-digit numeric delivery code, generated fresh at every assignment.
fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", id[..8].to_uppercase())
}

fn model_to_response(model: OrderModel) -> OrderResponse {
    OrderResponse {
        id: model.id,
        order_number: model.order_number,
        order_type: model.order_type,
        cement_type: model.cement_type,
        quantity: model.quantity,
        unit: model.unit,
        customer_id: model.customer_id,
        depot_id: model.depot_id,
        supplier_id: model.supplier_id,
        truck_id: model.truck_id,
        driver_id: model.driver_id,
        status: model.status,
        purchase_price: model.purchase_price,
        sale_price: model.sale_price,
        total_purchase: model.total_purchase,
        total_amount: model.total_amount,
        cement_profit: model.cement_profit,
        margin_percent: model.margin_percent,
        fuel_cost: model.fuel_cost,
        driver_allowance: model.driver_allowance,
        other_trip_costs: model.other_trip_costs,
        total_trip_cost: model.total_trip_cost,
        payment_status: model.payment_status,
        payment_terms: model.payment_terms,
        delivery_otp: model.delivery_otp,
        delivery_address: model.delivery_address,
        waybill_number: model.waybill_number,
        gate_pass_number: model.gate_pass_number,
        loading_manifest_number: model.loading_manifest_number,
        atc_number: model.atc_number,
        cap_number: model.cap_number,
        created_at: model.created_at,
        updated_at: model.updated_at,
        version: model.version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let value: u32 = otp.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn order_numbers_carry_prefix_and_are_distinct() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(a.starts_with("ORD-"));
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
    }
}
