use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::credit_note::ActiveModel as CreditNoteActiveModel,
    entities::customer::{ActiveModel as CustomerActiveModel, Entity as CustomerEntity},
    entities::driver_transaction::{
        ActiveModel as DriverTransactionActiveModel, TransactionType,
    },
    entities::order::{self, Entity as OrderEntity, OrderStatus},
    entities::shortage::{ActiveModel as ShortageActiveModel, Liability, ShortageStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::fleet::FleetService,
};

/// Reported quantities must conserve the dispatched quantity to within
/// this tolerance. Covers decimal drift from ton fractions entered at the
/// delivery site.
pub const QUANTITY_TOLERANCE: Decimal = dec!(0.01);

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReconciliationRequest {
    pub otp: String,
    pub good_qty: Decimal,
    pub missing_qty: Decimal,
    pub damaged_qty: Decimal,
    pub reason: Option<String>,
    pub liability: Option<Liability>,
    pub deduction_amount: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReconciliationOutcome {
    pub order_id: Uuid,
    pub order_number: String,
    pub shortage_id: Option<Uuid>,
    pub shortage_qty: Decimal,
    pub credit_note_amount: Decimal,
    pub wallet_deduction: Decimal,
}

/// Closes out a dispatched order against what actually arrived. The whole
/// settlement is one transaction: shortage record, driver wallet
/// deduction, customer credit note, status flip and reservation release
/// either all land or none do.
#[derive(Clone)]
pub struct ReconciliationService {
    db_pool: Arc<DbPool>,
    fleet: FleetService,
    event_sender: Option<Arc<EventSender>>,
}

impl ReconciliationService {
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

    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn submit(
        &self,
        order_id: Uuid,
        request: ReconciliationRequest,
    ) -> Result<ReconciliationOutcome, ServiceError> {
        if request.good_qty < Decimal::ZERO
            || request.missing_qty < Decimal::ZERO
            || request.damaged_qty < Decimal::ZERO
        {
            return Err(ServiceError::ValidationError(
                "Reported quantities cannot be negative".to_string(),
            ));
        }
        if request.deduction_amount.is_some_and(|d| d < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Deduction amount cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        match order.status {
            OrderStatus::Dispatched => {}
            OrderStatus::Delivered => {
                return Err(ServiceError::Conflict(format!(
                    "Order {} is already reconciled",
                    order.order_number
                )));
            }
            other => {
                return Err(ServiceError::PreconditionFailed(format!(
                    "Order {} is {} and cannot be reconciled",
                    order.order_number, other
                )));
            }
        }

        // Quantity conservation first: a wrong breakdown is a data entry
        // problem and should surface before the OTP is burned on it.
        let reported = request.good_qty + request.missing_qty + request.damaged_qty;
        let drift = (reported - order.quantity).abs();
        if drift > QUANTITY_TOLERANCE {
            return Err(ServiceError::ValidationError(format!(
                "Reported quantities total {} but {} was dispatched",
                reported, order.quantity
            )));
        }

        let expected_otp = order.delivery_otp.as_deref().ok_or_else(|| {
            ServiceError::PreconditionFailed(format!(
                "Order {} has no delivery code on record",
                order.order_number
            ))
        })?;
        if request.otp.trim().is_empty() || request.otp != expected_otp {
            warn!(order_id = %order_id, "Reconciliation rejected: delivery code mismatch");
            return Err(ServiceError::OtpMismatch(
                "Delivery code does not match".to_string(),
            ));
        }

        let shortage_qty = request.missing_qty + request.damaged_qty;
        let mut shortage_id = None;
        let mut credit_note_amount = Decimal::ZERO;
        let mut wallet_deduction = Decimal::ZERO;
        let mut deducted_driver = None;

        if shortage_qty > Decimal::ZERO {
            let reason = request
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| {
                    ServiceError::ValidationError(
                        "A reason is required when quantities are missing or damaged".to_string(),
                    )
                })?
                .to_string();

            let liability = request.liability.unwrap_or(Liability::Driver);
            let deduction_amount = request.deduction_amount.unwrap_or(Decimal::ZERO);
            let deduct_now = liability == Liability::Driver && deduction_amount > Decimal::ZERO;

            let new_shortage_id = Uuid::new_v4();
            let shortage = ShortageActiveModel {
                id: Set(new_shortage_id),
                order_id: Set(order_id),
                dispatched_qty: Set(order.quantity),
                good_qty: Set(request.good_qty),
                missing_qty: Set(request.missing_qty),
                damaged_qty: Set(request.damaged_qty),
                liability: Set(liability),
                deduction_amount: Set(deduction_amount),
                reason: Set(Some(reason)),
                status: Set(if deduct_now {
                    ShortageStatus::Deducted
                } else {
                    ShortageStatus::Pending
                }),
                created_at: Set(now),
            };
            shortage.insert(&txn).await.map_err(|e| {
                ServiceError::conflict_on_unique(e, "A shortage is already recorded for this order")
            })?;
            shortage_id = Some(new_shortage_id);

            if deduct_now {
                let driver_id = order.driver_id.ok_or_else(|| {
                    ServiceError::PreconditionFailed(format!(
                        "Order {} has no assigned driver to deduct from",
                        order.order_number
                    ))
                })?;
                let deduction = DriverTransactionActiveModel {
                    id: Set(Uuid::new_v4()),
                    driver_id: Set(driver_id),
                    order_id: Set(Some(order_id)),
                    transaction_type: Set(TransactionType::ShortageDeduction),
                    amount: Set(deduction_amount),
                    note: Set(Some(format!(
                        "Shortage on order {}: {} short",
                        order.order_number, shortage_qty
                    ))),
                    created_at: Set(now),
                };
                deduction.insert(&txn).await?;
                wallet_deduction = deduction_amount;
                deducted_driver = Some(driver_id);
            }

            // Undelivered goods come off the customer's bill at sale price.
            credit_note_amount = shortage_qty * order.sale_price;
            let credit_note = CreditNoteActiveModel {
                id: Set(Uuid::new_v4()),
                customer_id: Set(order.customer_id),
                order_id: Set(order_id),
                amount: Set(credit_note_amount),
                reason: Set(format!(
                    "Undelivered quantity on order {}: {} missing, {} damaged",
                    order.order_number, request.missing_qty, request.damaged_qty
                )),
                created_at: Set(now),
            };
            credit_note.insert(&txn).await?;

            if let Some(customer) = CustomerEntity::find_by_id(order.customer_id)
                .one(&txn)
                .await?
            {
                let balance = customer.current_balance;
                let mut active: CustomerActiveModel = customer.into();
                active.current_balance = Set(balance - credit_note_amount);
                active.updated_at = Set(Some(now));
                active.update(&txn).await?;
            }
        }

        let order_number = order.order_number.clone();
        let customer_id = order.customer_id;
        let missing_qty = request.missing_qty;
        let damaged_qty = request.damaged_qty;
        let version = order.version;

        // Compare-and-swap on (id, status, version), same as dispatch: a
        // racing reconciliation matches zero rows and the whole settlement
        // rolls back instead of landing twice.
        let result = OrderEntity::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Delivered))
            .col_expr(order::Column::UpdatedAt, Expr::value(Some(now)))
            .col_expr(order::Column::Version, Expr::value(version + 1))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(OrderStatus::Dispatched))
            .filter(order::Column::Version.eq(version))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(ServiceError::ConcurrentModification(order_id));
        }

        self.fleet.release(&txn, order_id).await?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            order_number = %order_number,
            shortage_qty = %shortage_qty,
            "Order reconciled and delivered"
        );
        metrics::counter!("cemflow_orders.delivered", 1);

        self.emit(Event::OrderDelivered(order_id)).await;
        if shortage_qty > Decimal::ZERO {
            self.emit(Event::ShortageRecorded {
                order_id,
                missing_qty,
                damaged_qty,
            })
            .await;
            self.emit(Event::CreditNoteIssued {
                customer_id,
                order_id,
                amount: credit_note_amount,
            })
            .await;
        }
        if let Some(driver_id) = deducted_driver {
            self.emit(Event::WalletTransactionRecorded {
                driver_id,
                transaction_type: TransactionType::ShortageDeduction,
                amount: wallet_deduction,
            })
            .await;
        }

        Ok(ReconciliationOutcome {
            order_id,
            order_number,
            shortage_id,
            shortage_qty,
            credit_note_amount,
            wallet_deduction,
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
