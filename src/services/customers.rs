use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::customer::{
        self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity, Model as CustomerModel,
    },
    entities::order::Model as OrderModel,
    entities::payment::PaymentStatus,
    errors::ServiceError,
};

/// The financial-clearance gate checked before dispatch. Pure: a confirmed
/// payment clears unconditionally; otherwise the order must fit inside the
/// remaining credit headroom.
pub fn is_financially_cleared(order: &OrderModel, customer: &CustomerModel) -> bool {
    order.payment_status == PaymentStatus::Confirmed
        || customer.current_balance + order.total_amount <= customer.credit_limit
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub credit_limit: Decimal,
    pub price_tier: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CustomerBalance {
    pub customer_id: Uuid,
    pub current_balance: Decimal,
    pub credit_limit: Decimal,
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request.validate()?;

        let model = CustomerActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            phone: Set(request.phone),
            credit_limit: Set(request.credit_limit),
            current_balance: Set(Decimal::ZERO),
            price_tier: Set(request.price_tier),
            blocked: Set(false),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        info!(customer_id = %created.id, "Customer created");
        Ok(created)
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<CustomerModel, ServiceError> {
        CustomerEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))
    }

    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<CustomerModel>, u64), ServiceError> {
        let paginator = CustomerEntity::find()
            .order_by_asc(customer::Column::Name)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((customers, total))
    }

    pub async fn get_balance(&self, id: Uuid) -> Result<CustomerBalance, ServiceError> {
        let customer = self.get_customer(id).await?;
        Ok(CustomerBalance {
            customer_id: customer.id,
            current_balance: customer.current_balance,
            credit_limit: customer.credit_limit,
        })
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<CustomerModel, ServiceError> {
        let customer = self.get_customer(id).await?;
        let mut active: CustomerActiveModel = customer.into();
        active.blocked = Set(blocked);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(&*self.db).await?;
        info!(customer_id = %updated.id, blocked = blocked, "Customer block flag updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::{OrderStatus, OrderType, QuantityUnit};
    use rust_decimal_macros::dec;

    fn customer(balance: Decimal, limit: Decimal) -> CustomerModel {
        CustomerModel {
            id: Uuid::new_v4(),
            name: "Bedrock Builders".into(),
            phone: None,
            credit_limit: limit,
            current_balance: balance,
            price_tier: None,
            blocked: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn order(total: Decimal, payment_status: PaymentStatus) -> OrderModel {
        OrderModel {
            id: Uuid::new_v4(),
            order_number: "ORD-TEST0001".into(),
            order_type: OrderType::DepotDispatch,
            cement_type: "42.5R".into(),
            quantity: dec!(30),
            unit: QuantityUnit::Tons,
            customer_id: Uuid::new_v4(),
            depot_id: Uuid::new_v4(),
            supplier_id: None,
            truck_id: None,
            driver_id: None,
            status: OrderStatus::Requested,
            purchase_price: dec!(0),
            sale_price: dec!(0),
            total_purchase: dec!(0),
            total_amount: total,
            cement_profit: dec!(0),
            margin_percent: dec!(0),
            fuel_cost: dec!(0),
            driver_allowance: dec!(0),
            other_trip_costs: dec!(0),
            total_trip_cost: dec!(0),
            payment_status,
            payment_terms: None,
            delivery_otp: None,
            delivery_address: None,
            waybill_number: None,
            gate_pass_number: None,
            loading_manifest_number: None,
            atc_number: None,
            cap_number: None,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        }
    }

    #[test]
    fn over_limit_order_is_blocked_unless_payment_confirmed() {
        let cust = customer(dec!(90000), dec!(100000));

        let unpaid = order(dec!(20000), PaymentStatus::Pending);
        assert!(!is_financially_cleared(&unpaid, &cust));

        let paid = order(dec!(20000), PaymentStatus::Confirmed);
        assert!(is_financially_cleared(&paid, &cust));
    }

    #[test]
    fn order_exactly_at_limit_is_cleared() {
        let cust = customer(dec!(90000), dec!(100000));
        let at_limit = order(dec!(10000), PaymentStatus::Pending);
        assert!(is_financially_cleared(&at_limit, &cust));
    }

    #[test]
    fn zero_balance_customer_clears_within_limit() {
        let cust = customer(dec!(0), dec!(50000));
        assert!(is_financially_cleared(
            &order(dec!(50000), PaymentStatus::Pending),
            &cust
        ));
        assert!(!is_financially_cleared(
            &order(dec!(50001), PaymentStatus::Pending),
            &cust
        ));
    }
}
