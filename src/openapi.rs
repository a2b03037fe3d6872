use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cemflow API",
        version = "1.0.0",
        description = r#"
# Cemflow Cement Distribution API

Backend for a cement distribution operation: order intake, fleet dispatch,
delivery reconciliation, customer credit, payments and driver wallets.

## Order pipeline

Orders move `requested` -> `dispatched` -> `delivered`. Dispatch requires
financial clearance and an available truck+driver pair; reconciliation is
gated by the 6-digit delivery code generated at dispatch.

## Pagination

List endpoints take `page` (default 1) and `limit` (default 20).
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order lifecycle endpoints"),
        (name = "Fleet", description = "Truck and driver availability"),
        (name = "Customers", description = "Customer and credit endpoints"),
        (name = "Payments", description = "Payment recording and settlement"),
        (name = "Drivers", description = "Driver wallet ledger"),
        (name = "Documents", description = "Printable HTML artifacts"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_number,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::order_metrics,
        crate::handlers::orders::dispatch_order,
        crate::handlers::orders::reconcile_order,

        // Fleet
        crate::handlers::fleet::available_pairs,
        crate::handlers::fleet::busy_trucks,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::get_customer_balance,
        crate::handlers::customers::block_customer,
        crate::handlers::customers::unblock_customer,

        // Payments
        crate::handlers::payments::list_payments,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::resolve_payment,

        // Drivers
        crate::handlers::drivers::list_wallet_transactions,
        crate::handlers::drivers::record_wallet_transaction,
        crate::handlers::drivers::wallet_balance,

        // Expenses and purchases
        crate::handlers::expenses::list_order_expenses,
        crate::handlers::expenses::record_order_expense,
        crate::handlers::expenses::list_supplier_purchases,

        // Documents
        crate::handlers::documents::order_document,
        crate::handlers::documents::payment_receipt,
        crate::handlers::documents::customer_statement,

        // Health
        crate::handlers::health::health,
        crate::handlers::health::readiness,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Order types
            crate::services::orders::OrderResponse,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderDetails,
            crate::services::orders::DispatchRequest,
            crate::services::orders::OrderMetrics,
            crate::services::orders::StatusCount,
            crate::entities::order::OrderStatus,
            crate::entities::order::OrderType,
            crate::entities::order::QuantityUnit,

            // Reconciliation types
            crate::services::reconciliation::ReconciliationRequest,
            crate::services::reconciliation::ReconciliationOutcome,
            crate::entities::shortage::Liability,
            crate::entities::shortage::ShortageStatus,

            // Fleet types
            crate::services::fleet::FleetPair,

            // Customer types
            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::CustomerBalance,
            crate::entities::customer::Model,

            // Payment types
            crate::services::payments::CreatePaymentRequest,
            crate::handlers::payments::ResolvePaymentRequest,
            crate::entities::payment::Model,
            crate::entities::payment::PaymentStatus,
            crate::entities::payment::PaymentMethod,

            // Expense and purchase types
            crate::services::expenses::RecordExpenseRequest,
            crate::entities::expense::Model,
            crate::entities::purchase::Model,

            // Wallet types
            crate::services::wallet::RecordTransactionRequest,
            crate::services::wallet::WalletBalance,
            crate::entities::driver_transaction::Model,
            crate::entities::driver_transaction::TransactionType,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("Cemflow API"));
        assert!(json.contains("/api/v1/orders"));
        assert!(json.contains("/api/v1/fleet/available"));
    }
}
