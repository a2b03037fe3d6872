use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::driver_transaction::TransactionType;
use crate::entities::order::OrderStatus;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order lifecycle events
    OrderCreated(Uuid),
    OrderUpdated(Uuid),
    OrderDeleted(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderDispatched {
        order_id: Uuid,
        truck_id: Uuid,
        driver_id: Uuid,
    },
    OrderDelivered(Uuid),

    // Settlement events
    ShortageRecorded {
        order_id: Uuid,
        missing_qty: Decimal,
        damaged_qty: Decimal,
    },
    CreditNoteIssued {
        customer_id: Uuid,
        order_id: Uuid,
        amount: Decimal,
    },
    WalletTransactionRecorded {
        driver_id: Uuid,
        transaction_type: TransactionType,
        amount: Decimal,
    },

    // Payment events
    PaymentRecorded(Uuid),
    PaymentConfirmed(Uuid),
    PaymentRejected(Uuid),
}

/// Drains the event channel, logging every event. There is no queue or
/// retry layer behind this; events are observability signals, not
/// coordination.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderDispatched {
                order_id,
                truck_id,
                driver_id,
            } => {
                info!(
                    order_id = %order_id,
                    truck_id = %truck_id,
                    driver_id = %driver_id,
                    "Order dispatched"
                );
            }
            Event::ShortageRecorded {
                order_id,
                missing_qty,
                damaged_qty,
            } => {
                warn!(
                    order_id = %order_id,
                    missing_qty = %missing_qty,
                    damaged_qty = %damaged_qty,
                    "Delivery shortage recorded"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event channel closed; event processing loop stopped");
}
