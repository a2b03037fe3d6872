use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentStatus;

/// Status pipeline for an order. `InGate` and `Loaded` are stored statuses
/// used by depot gate workflows; the dispatch pipeline itself only drives
/// `Requested` -> `Dispatched` -> `Delivered`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "requested")]
    Requested,
    #[sea_orm(string_value = "in_gate")]
    InGate,
    #[sea_orm(string_value = "loaded")]
    Loaded,
    #[sea_orm(string_value = "dispatched")]
    Dispatched,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    /// Cement hauled straight from the plant to the customer, with a
    /// linked supplier purchase on the cost side.
    #[sea_orm(string_value = "plant_direct")]
    PlantDirect,
    /// Cement dispatched out of depot stock.
    #[sea_orm(string_value = "depot_dispatch")]
    DepotDispatch,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuantityUnit {
    #[sea_orm(string_value = "tons")]
    Tons,
    #[sea_orm(string_value = "bags")]
    Bags,
}

/// The `orders` table: one haulage+trading transaction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
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

    // Dual-stream pricing: cement trading stream
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub total_purchase: Decimal,
    pub total_amount: Decimal,
    pub cement_profit: Decimal,
    pub margin_percent: Decimal,

    // Haulage stream
    pub fuel_cost: Decimal,
    pub driver_allowance: Decimal,
    pub other_trip_costs: Decimal,
    pub total_trip_cost: Decimal,

    pub payment_status: PaymentStatus,
    pub payment_terms: Option<String>,

    // Delivery fields
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::depot::Entity",
        from = "Column::DepotId",
        to = "super::depot::Column::Id"
    )]
    Depot,
    #[sea_orm(has_many = "super::shortage::Entity")]
    Shortages,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::depot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Depot.def()
    }
}

impl Related<super::shortage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shortages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
