pub mod customers;
pub mod documents;
pub mod expenses;
pub mod fleet;
pub mod orders;
pub mod payments;
pub mod reconciliation;
pub mod wallet;

pub use customers::CustomerService;
pub use expenses::ExpenseService;
pub use fleet::FleetService;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use reconciliation::ReconciliationService;
pub use wallet::WalletService;
