use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use cemflow_api::{
    config::AppConfig,
    db,
    entities::{
        compliance_document, depot, depot_stock, driver, supplier, truck,
        order::QuantityUnit,
    },
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Helper harness for spinning up an application state backed by a
/// file-based SQLite database in a temp directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let db_path = tmp.path().join("cemflow_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Some(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender: Some(event_sender),
            services,
        };

        let router = Router::new()
            .merge(cemflow_api::health_routes())
            .nest("/api/v1", cemflow_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _tmp: tmp,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request and decode the JSON body, asserting the status code.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        expected_status: StatusCode,
    ) -> Value {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let text = String::from_utf8_lossy(&bytes).to_string();
        assert_eq!(status, expected_status, "unexpected status, body: {}", text);
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        }
    }

    // --- seed helpers -----------------------------------------------------

    pub async fn seed_customer(&self, name: &str, credit_limit: Decimal) -> Uuid {
        let body = self
            .request_json(
                Method::POST,
                "/api/v1/customers",
                Some(serde_json::json!({
                    "name": name,
                    "credit_limit": credit_limit,
                })),
                StatusCode::CREATED,
            )
            .await;
        Uuid::parse_str(body["data"]["id"].as_str().expect("customer id"))
            .expect("customer id is a uuid")
    }

    pub async fn seed_depot(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        depot::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            location: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed depot");
        id
    }

    pub async fn seed_depot_stock(&self, depot_id: Uuid, cement_type: &str, quantity: Decimal) {
        depot_stock::ActiveModel {
            id: Set(Uuid::new_v4()),
            depot_id: Set(depot_id),
            cement_type: Set(cement_type.to_string()),
            quantity: Set(quantity),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed depot stock");
    }

    pub async fn seed_supplier(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        supplier::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            contact: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed supplier");
        id
    }

    pub async fn seed_driver(&self, name: &str, active: bool) -> Uuid {
        let id = Uuid::new_v4();
        driver::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            phone: Set(None),
            license_number: Set(None),
            active: Set(active),
            trip_allowance: Set(dec!(5000)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed driver");
        id
    }

    pub async fn seed_truck(&self, plate: &str, driver_id: Option<Uuid>, active: bool) -> Uuid {
        let id = Uuid::new_v4();
        truck::ActiveModel {
            id: Set(id),
            plate_number: Set(plate.to_string()),
            capacity: Set(dec!(30)),
            unit: Set(QuantityUnit::Tons),
            active: Set(active),
            driver_id: Set(driver_id),
            default_fuel_cost: Set(dec!(45000)),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed truck");
        id
    }

    /// Seeds an already-expired compliance document for a truck or driver.
    pub async fn seed_expired_document(
        &self,
        entity_type: compliance_document::FleetEntityType,
        entity_id: Uuid,
        doc_type: &str,
    ) {
        compliance_document::ActiveModel {
            id: Set(Uuid::new_v4()),
            entity_type: Set(entity_type),
            entity_id: Set(entity_id),
            doc_type: Set(doc_type.to_string()),
            expires_at: Set(Utc::now() - Duration::days(3)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("seed compliance document");
    }

    /// Seeds a complete ready-to-dispatch setup: customer with generous
    /// credit, depot with stock, paired truck and driver.
    pub async fn seed_dispatch_fixture(&self) -> DispatchFixture {
        let customer_id = self.seed_customer("Acme Builders", dec!(10000000)).await;
        let depot_id = self.seed_depot("Main Depot").await;
        self.seed_depot_stock(depot_id, "42.5R", dec!(500)).await;
        let driver_id = self.seed_driver("Sule Adamu", true).await;
        let truck_id = self.seed_truck("KJA-120-XA", Some(driver_id), true).await;
        DispatchFixture {
            customer_id,
            depot_id,
            driver_id,
            truck_id,
        }
    }

    /// Creates a depot_dispatch order through the API, returning its id.
    pub async fn create_order(&self, fixture: &DispatchFixture, quantity: Decimal) -> Uuid {
        let body = self
            .request_json(
                Method::POST,
                "/api/v1/orders",
                Some(serde_json::json!({
                    "order_type": "depot_dispatch",
                    "cement_type": "42.5R",
                    "quantity": quantity,
                    "unit": "tons",
                    "customer_id": fixture.customer_id,
                    "depot_id": fixture.depot_id,
                    "purchase_price": dec!(700),
                    "sale_price": dec!(850),
                })),
                StatusCode::CREATED,
            )
            .await;
        Uuid::parse_str(body["data"]["id"].as_str().expect("order id")).expect("order id is uuid")
    }

    /// Dispatches an order with the fixture's truck and driver.
    pub async fn dispatch_order(&self, fixture: &DispatchFixture, order_id: Uuid) -> Value {
        self.request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/dispatch", order_id),
            Some(serde_json::json!({
                "truck_id": fixture.truck_id,
                "driver_id": fixture.driver_id,
            })),
            StatusCode::OK,
        )
        .await
    }

    /// Reads the delivery OTP straight from the order row.
    pub async fn delivery_otp(&self, order_id: Uuid) -> String {
        use cemflow_api::entities::order::Entity as OrderEntity;
        use sea_orm::EntityTrait;
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.state.db)
            .await
            .expect("load order")
            .expect("order exists");
        order.delivery_otp.expect("order has an OTP after dispatch")
    }
}

pub struct DispatchFixture {
    pub customer_id: Uuid,
    pub depot_id: Uuid,
    pub driver_id: Uuid,
    pub truck_id: Uuid,
}
