pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Option<Arc<events::EventSender>>,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let orders = Router::new()
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/metrics", get(handlers::orders::order_metrics))
        .route(
            "/orders/by-number/:order_number",
            get(handlers::orders::get_order_by_number),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/orders/:id", put(handlers::orders::update_order))
        .route("/orders/:id", delete(handlers::orders::delete_order))
        .route("/orders/:id/dispatch", post(handlers::orders::dispatch_order))
        .route(
            "/orders/:id/reconcile",
            post(handlers::orders::reconcile_order),
        )
        .route(
            "/orders/:id/documents/:kind",
            get(handlers::documents::order_document),
        )
        .route(
            "/orders/:id/expenses",
            get(handlers::expenses::list_order_expenses)
                .post(handlers::expenses::record_order_expense),
        );

    let fleet = Router::new()
        .route("/fleet/available", get(handlers::fleet::available_pairs))
        .route("/fleet/busy", get(handlers::fleet::busy_trucks));

    let customers = Router::new()
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route("/customers/:id", get(handlers::customers::get_customer))
        .route(
            "/customers/:id/balance",
            get(handlers::customers::get_customer_balance),
        )
        .route(
            "/customers/:id/block",
            post(handlers::customers::block_customer),
        )
        .route(
            "/customers/:id/unblock",
            post(handlers::customers::unblock_customer),
        )
        .route(
            "/customers/:id/statement",
            get(handlers::documents::customer_statement),
        );

    let payments = Router::new()
        .route(
            "/payments",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route("/payments/:id", get(handlers::payments::get_payment))
        .route(
            "/payments/:id/confirm",
            post(handlers::payments::resolve_payment),
        )
        .route(
            "/payments/:id/receipt",
            get(handlers::documents::payment_receipt),
        );

    let suppliers = Router::new().route(
        "/suppliers/:id/purchases",
        get(handlers::expenses::list_supplier_purchases),
    );

    let drivers = Router::new()
        .route(
            "/drivers/:id/wallet",
            get(handlers::drivers::list_wallet_transactions)
                .post(handlers::drivers::record_wallet_transaction),
        )
        .route(
            "/drivers/:id/wallet/balance",
            get(handlers::drivers::wallet_balance),
        );

    Router::new()
        .merge(orders)
        .merge(fleet)
        .merge(customers)
        .merge(payments)
        .merge(suppliers)
        .merge(drivers)
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::readiness))
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn success_response_carries_data_and_timestamp() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert_eq!(response.data, Some("ok"));
        let meta = response.meta.expect("metadata expected");
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn error_response_has_no_data() {
        let response = ApiResponse::<()>::error("oops".into());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("oops"));
    }
}
