use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a wallet entry is a property of its type, decided at fold
/// time. `Other` is the catch-all credit bucket (there is no separate
/// category field).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "shortage_deduction")]
    ShortageDeduction,
    #[sea_orm(string_value = "allowance")]
    Allowance,
    #[sea_orm(string_value = "salary_payment")]
    SalaryPayment,
    #[sea_orm(string_value = "bonus")]
    Bonus,
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "other")]
    Other,
}

impl TransactionType {
    /// Credits grow the wallet; shortage deductions and salary payouts
    /// shrink it.
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            TransactionType::Allowance
                | TransactionType::Bonus
                | TransactionType::Deposit
                | TransactionType::Other
        )
    }
}

/// Append-only ledger line for a driver's wallet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[schema(as = DriverTransaction)]
#[sea_orm(table_name = "driver_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub driver_id: Uuid,
    pub order_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id"
    )]
    Driver,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
