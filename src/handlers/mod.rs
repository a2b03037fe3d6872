use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services::{
    CustomerService, ExpenseService, FleetService, OrderService, PaymentService,
    ReconciliationService, WalletService,
};

pub mod customers;
pub mod documents;
pub mod drivers;
pub mod expenses;
pub mod fleet;
pub mod health;
pub mod orders;
pub mod payments;

/// Service container shared across handlers via AppState.
#[derive(Clone)]
pub struct AppServices {
    pub order: Arc<OrderService>,
    pub reconciliation: Arc<ReconciliationService>,
    pub fleet: FleetService,
    pub customers: Arc<CustomerService>,
    pub payments: Arc<PaymentService>,
    pub wallet: Arc<WalletService>,
    pub expenses: Arc<ExpenseService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        let fleet = FleetService::new(db.clone());
        Self {
            order: Arc::new(OrderService::new(
                db.clone(),
                fleet.clone(),
                event_sender.clone(),
            )),
            reconciliation: Arc::new(ReconciliationService::new(
                db.clone(),
                fleet.clone(),
                event_sender.clone(),
            )),
            fleet,
            customers: Arc::new(CustomerService::new(db.clone())),
            payments: Arc::new(PaymentService::new(db.clone(), event_sender)),
            wallet: Arc::new(WalletService::new(db.clone())),
            expenses: Arc::new(ExpenseService::new(db)),
        }
    }
}
