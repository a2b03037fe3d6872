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
    entities::driver::Entity as DriverEntity,
    entities::driver_transaction::{
        self, ActiveModel as TransactionActiveModel, Entity as TransactionEntity,
        Model as TransactionModel, TransactionType,
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RecordTransactionRequest {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub order_id: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WalletBalance {
    pub driver_id: Uuid,
    pub balance: Decimal,
    pub transaction_count: u64,
}

/// Append-only driver wallet. Balances are never stored; they are always
/// the fold of the ledger, so a balance can never drift from its history.
#[derive(Clone)]
pub struct WalletService {
    db: Arc<DatabaseConnection>,
}

impl WalletService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(driver_id = %driver_id))]
    pub async fn record(
        &self,
        driver_id: Uuid,
        request: RecordTransactionRequest,
    ) -> Result<TransactionModel, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Transaction amount must be positive; the type decides the sign".to_string(),
            ));
        }

        DriverEntity::find_by_id(driver_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Driver {} not found", driver_id)))?;

        let active = TransactionActiveModel {
            id: Set(Uuid::new_v4()),
            driver_id: Set(driver_id),
            order_id: Set(request.order_id),
            transaction_type: Set(request.transaction_type),
            amount: Set(request.amount),
            note: Set(request.note),
            created_at: Set(Utc::now()),
        };
        let model = active.insert(&*self.db).await?;

        info!(
            transaction_id = %model.id,
            transaction_type = %model.transaction_type,
            amount = %model.amount,
            "Wallet transaction recorded"
        );

        Ok(model)
    }

    pub async fn balance(&self, driver_id: Uuid) -> Result<WalletBalance, ServiceError> {
        DriverEntity::find_by_id(driver_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Driver {} not found", driver_id)))?;

        let transactions = TransactionEntity::find()
            .filter(driver_transaction::Column::DriverId.eq(driver_id))
            .all(&*self.db)
            .await?;

        let balance = fold_balance(&transactions);

        Ok(WalletBalance {
            driver_id,
            balance,
            transaction_count: transactions.len() as u64,
        })
    }

    pub async fn list(&self, driver_id: Uuid) -> Result<Vec<TransactionModel>, ServiceError> {
        Ok(TransactionEntity::find()
            .filter(driver_transaction::Column::DriverId.eq(driver_id))
            .order_by_desc(driver_transaction::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}

pub fn fold_balance(transactions: &[TransactionModel]) -> Decimal {
    transactions.iter().fold(Decimal::ZERO, |acc, tx| {
        if tx.transaction_type.is_credit() {
            acc + tx.amount
        } else {
            acc - tx.amount
        }
    })
}
