use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::customer::{ActiveModel as CustomerActiveModel, Entity as CustomerEntity},
    entities::order::{ActiveModel as OrderActiveModel, Entity as OrderEntity},
    entities::payment::{
        self, ActiveModel as PaymentActiveModel, Entity as PaymentEntity, Model as PaymentModel,
        PaymentMethod, PaymentStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatePaymentRequest {
    pub customer_id: Uuid,
    pub order_id: Option<Uuid>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[derive(Debug, Default)]
pub struct PaymentFilter {
    pub customer_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

/// Records customer payments and settles them against the receivable.
/// Cash and POS confirm at creation; transfer and cheque wait for an
/// explicit confirm or reject. Settlement (balance reduction, order
/// payment_status flip) always happens in the same transaction as the
/// status write.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentModel, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let payment_id = Uuid::new_v4();
        let auto_confirms = request.method.auto_confirms();

        let txn = db.begin().await?;

        CustomerEntity::find_by_id(request.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Customer {} not found",
                    request.customer_id
                ))
            })?;

        if let Some(order_id) = request.order_id {
            OrderEntity::find_by_id(order_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!("Order {} not found", order_id))
                })?;
        }

        let active = PaymentActiveModel {
            id: Set(payment_id),
            customer_id: Set(request.customer_id),
            order_id: Set(request.order_id),
            amount: Set(request.amount),
            method: Set(request.method),
            status: Set(if auto_confirms {
                PaymentStatus::Confirmed
            } else {
                PaymentStatus::Pending
            }),
            reference: Set(request.reference),
            created_at: Set(now),
            updated_at: Set(None),
        };
        let payment_model = active.insert(&txn).await?;

        if auto_confirms {
            settle_confirmed_payment(&txn, &payment_model).await?;
        }

        txn.commit().await?;

        info!(
            payment_id = %payment_id,
            method = %payment_model.method,
            status = %payment_model.status,
            "Payment recorded"
        );

        self.emit(Event::PaymentRecorded(payment_id)).await;
        if auto_confirms {
            self.emit(Event::PaymentConfirmed(payment_id)).await;
        }

        Ok(payment_model)
    }

    /// Resolves a pending payment. `Confirmed` settles it against the
    /// customer balance; `Rejected` leaves balances untouched.
    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn resolve_payment(
        &self,
        payment_id: Uuid,
        resolution: PaymentStatus,
    ) -> Result<PaymentModel, ServiceError> {
        if resolution == PaymentStatus::Pending {
            return Err(ServiceError::ValidationError(
                "A payment cannot be resolved back to pending".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await?;

        let payment_model = PaymentEntity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))?;

        if payment_model.status != PaymentStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Payment is already {}",
                payment_model.status
            )));
        }

        // Compare-and-swap on pending status: if a racing resolution got
        // there first, zero rows match and the payment settles exactly once.
        let result = PaymentEntity::update_many()
            .col_expr(payment::Column::Status, Expr::value(resolution))
            .col_expr(payment::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(payment::Column::Id.eq(payment_id))
            .filter(payment::Column::Status.eq(PaymentStatus::Pending))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(ServiceError::Conflict(
                "Payment is already resolved".to_string(),
            ));
        }

        let updated = PaymentEntity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))?;

        if resolution == PaymentStatus::Confirmed {
            settle_confirmed_payment(&txn, &updated).await?;
        }

        txn.commit().await?;

        info!(payment_id = %payment_id, resolution = %resolution, "Payment resolved");

        match resolution {
            PaymentStatus::Confirmed => self.emit(Event::PaymentConfirmed(payment_id)).await,
            PaymentStatus::Rejected => self.emit(Event::PaymentRejected(payment_id)).await,
            PaymentStatus::Pending => unreachable!("rejected above"),
        }

        Ok(updated)
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentModel, ServiceError> {
        PaymentEntity::find_by_id(payment_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))
    }

    pub async fn list_payments(
        &self,
        filter: PaymentFilter,
    ) -> Result<Vec<PaymentModel>, ServiceError> {
        let mut query = PaymentEntity::find().order_by_desc(payment::Column::CreatedAt);
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(payment::Column::CustomerId.eq(customer_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(payment::Column::Status.eq(status));
        }
        Ok(query.all(&*self.db_pool).await?)
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send event");
            }
        }
    }
}

/// Applies the financial effects of a confirmed payment inside the
/// caller's transaction: the receivable drops by the paid amount and a
/// linked order is marked paid.
async fn settle_confirmed_payment(
    txn: &DatabaseTransaction,
    payment_model: &PaymentModel,
) -> Result<(), ServiceError> {
    let now = Utc::now();

    if let Some(customer) = CustomerEntity::find_by_id(payment_model.customer_id)
        .one(txn)
        .await?
    {
        let balance = customer.current_balance;
        let mut active: CustomerActiveModel = customer.into();
        active.current_balance = Set(balance - payment_model.amount);
        active.updated_at = Set(Some(now));
        active.update(txn).await?;
    }

    if let Some(order_id) = payment_model.order_id {
        if let Some(order) = OrderEntity::find_by_id(order_id).one(txn).await? {
            let version = order.version;
            let mut active: OrderActiveModel = order.into();
            active.payment_status = Set(PaymentStatus::Confirmed);
            active.updated_at = Set(Some(now));
            active.version = Set(version + 1);
            active.update(txn).await?;
        }
    }

    Ok(())
}
