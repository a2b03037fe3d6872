mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn cash_payment_confirms_immediately_and_settles_the_balance() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    // 30t at 850/t puts 25500 on the customer's tab.
    let order_id = app.create_order(&fixture, dec!(30)).await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "order_id": order_id,
                "amount": dec!(25500),
                "method": "cash",
            })),
            StatusCode::CREATED,
        )
        .await;
    assert_eq!(body["data"]["status"], json!("Confirmed"));

    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("0"));

    let order = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(order["data"]["payment_status"], json!("Confirmed"));
}

#[tokio::test]
async fn transfers_wait_for_confirmation_before_settling() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "order_id": order_id,
                "amount": dec!(25500),
                "method": "transfer",
                "reference": "TRF/0091",
            })),
            StatusCode::CREATED,
        )
        .await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], json!("Pending"));

    // Nothing settled yet.
    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("25500"));

    app.request_json(
        Method::POST,
        &format!("/api/v1/payments/{}/confirm", payment_id),
        Some(json!({ "resolution": "Confirmed" })),
        StatusCode::OK,
    )
    .await;

    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("0"));

    let order = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(order["data"]["payment_status"], json!("Confirmed"));
}

#[tokio::test]
async fn rejected_payments_leave_the_ledger_alone() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "order_id": order_id,
                "amount": dec!(25500),
                "method": "cheque",
            })),
            StatusCode::CREATED,
        )
        .await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    let rejected = app
        .request_json(
            Method::POST,
            &format!("/api/v1/payments/{}/confirm", payment_id),
            Some(json!({ "resolution": "Rejected" })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(rejected["data"]["status"], json!("Rejected"));

    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("25500"));

    let order = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(order["data"]["payment_status"], json!("Pending"));
}

#[tokio::test]
async fn a_payment_can_only_be_resolved_once() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "amount": dec!(1000),
                "method": "transfer",
            })),
            StatusCode::CREATED,
        )
        .await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    app.request_json(
        Method::POST,
        &format!("/api/v1/payments/{}/confirm", payment_id),
        Some(json!({ "resolution": "Rejected" })),
        StatusCode::OK,
    )
    .await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/payments/{}/confirm", payment_id),
            Some(json!({ "resolution": "Confirmed" })),
            StatusCode::CONFLICT,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("already"));
}

#[tokio::test]
async fn resolving_back_to_pending_is_not_a_thing() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "amount": dec!(1000),
                "method": "transfer",
            })),
            StatusCode::CREATED,
        )
        .await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    app.request_json(
        Method::POST,
        &format!("/api/v1/payments/{}/confirm", payment_id),
        Some(json!({ "resolution": "Pending" })),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn negative_and_zero_amounts_are_rejected() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    for amount in ["0", "-500"] {
        app.request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "amount": amount,
                "method": "cash",
            })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    }
}

#[tokio::test]
async fn confirmed_payment_unlocks_an_over_limit_dispatch() {
    let app = TestApp::new().await;
    let mut fixture = app.seed_dispatch_fixture().await;
    // A customer with no credit room at all.
    fixture.customer_id = app.seed_customer("Cash Only Ltd", dec!(0)).await;

    let order_id = app.create_order(&fixture, dec!(30)).await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/dispatch", order_id),
            Some(json!({
                "truck_id": fixture.truck_id,
                "driver_id": fixture.driver_id,
            })),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("credit"));

    // Paying the order in full flips its payment status and clears the gate.
    app.request_json(
        Method::POST,
        "/api/v1/payments",
        Some(json!({
            "customer_id": fixture.customer_id,
            "order_id": order_id,
            "amount": dec!(25500),
            "method": "cash",
        })),
        StatusCode::CREATED,
    )
    .await;

    app.dispatch_order(&fixture, order_id).await;
}

#[tokio::test]
async fn blocked_customers_never_dispatch() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;

    app.request_json(
        Method::POST,
        &format!("/api/v1/customers/{}/block", fixture.customer_id),
        None,
        StatusCode::OK,
    )
    .await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/dispatch", order_id),
            Some(json!({
                "truck_id": fixture.truck_id,
                "driver_id": fixture.driver_id,
            })),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("blocked"));

    // Unblocking restores the normal credit path.
    app.request_json(
        Method::POST,
        &format!("/api/v1/customers/{}/unblock", fixture.customer_id),
        None,
        StatusCode::OK,
    )
    .await;
    app.dispatch_order(&fixture, order_id).await;
}

#[tokio::test]
async fn a_conflicting_confirm_never_settles_twice() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "order_id": order_id,
                "amount": dec!(25500),
                "method": "transfer",
            })),
            StatusCode::CREATED,
        )
        .await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    app.request_json(
        Method::POST,
        &format!("/api/v1/payments/{}/confirm", payment_id),
        Some(json!({ "resolution": "Confirmed" })),
        StatusCode::OK,
    )
    .await;
    app.request_json(
        Method::POST,
        &format!("/api/v1/payments/{}/confirm", payment_id),
        Some(json!({ "resolution": "Confirmed" })),
        StatusCode::CONFLICT,
    )
    .await;

    // The receivable dropped by the paid amount exactly once.
    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("0"));
}

#[tokio::test]
async fn receipts_render_for_recorded_payments() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    let body = app
        .request_json(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "customer_id": fixture.customer_id,
                "amount": dec!(12000),
                "method": "cash",
                "reference": "RCPT/0007",
            })),
            StatusCode::CREATED,
        )
        .await;
    let payment_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/payments/{}/receipt", payment_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Acme Builders"));
    assert!(html.contains("12000"));
    assert!(html.contains("RCPT/0007"));

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/payments/{}/receipt", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
