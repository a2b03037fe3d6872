use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::expense::{
        self, ActiveModel as ExpenseActiveModel, Entity as ExpenseEntity, Model as ExpenseModel,
    },
    entities::order::Entity as OrderEntity,
    entities::purchase::{self, Entity as PurchaseEntity, Model as PurchaseModel},
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RecordExpenseRequest {
    pub order_id: Option<Uuid>,
    pub category: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

/// Trip cost ledger plus the read side of supplier purchases.
#[derive(Clone)]
pub struct ExpenseService {
    db: Arc<DatabaseConnection>,
}

impl ExpenseService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn record(&self, request: RecordExpenseRequest) -> Result<ExpenseModel, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Expense amount must be positive".to_string(),
            ));
        }
        if request.category.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Expense category is required".to_string(),
            ));
        }

        if let Some(order_id) = request.order_id {
            OrderEntity::find_by_id(order_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!("Order {} not found", order_id))
                })?;
        }

        let active = ExpenseActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(request.order_id),
            category: Set(request.category.trim().to_string()),
            amount: Set(request.amount),
            note: Set(request.note),
            created_at: Set(Utc::now()),
        };
        let model = active.insert(&*self.db).await?;

        info!(expense_id = %model.id, category = %model.category, "Expense recorded");

        Ok(model)
    }

    pub async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<ExpenseModel>, ServiceError> {
        Ok(ExpenseEntity::find()
            .filter(expense::Column::OrderId.eq(order_id))
            .order_by_desc(expense::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn list_purchases_for_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<PurchaseModel>, ServiceError> {
        Ok(PurchaseEntity::find()
            .filter(purchase::Column::SupplierId.eq(supplier_id))
            .order_by_desc(purchase::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}
