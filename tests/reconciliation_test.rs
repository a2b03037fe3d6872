mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn quantity_conservation_is_checked_before_the_otp() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;

    // Wrong OTP AND wrong quantities: the quantity error wins (400, not 401).
    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/reconcile", order_id),
            Some(json!({
                "otp": "000000",
                "good_qty": dec!(10),
                "missing_qty": dec!(0),
                "damaged_qty": dec!(0),
            })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("dispatched"));
}

#[tokio::test]
async fn tolerance_allows_hundredth_of_a_ton_drift() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", order_id),
        Some(json!({
            "otp": otp,
            "good_qty": dec!(29.99),
            "missing_qty": dec!(0),
            "damaged_qty": dec!(0),
        })),
        StatusCode::OK,
    )
    .await;
}

#[tokio::test]
async fn wrong_otp_is_unauthorized_and_rolls_back() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;
    let wrong = if otp == "123456" { "654321" } else { "123456" };

    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", order_id),
        Some(json!({
            "otp": wrong,
            "good_qty": dec!(30),
            "missing_qty": dec!(0),
            "damaged_qty": dec!(0),
        })),
        StatusCode::UNAUTHORIZED,
    )
    .await;

    // Still dispatched, truck still busy.
    let order = app
        .request_json(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(order["data"]["status"], "dispatched");
    let busy = app
        .request_json(Method::GET, "/api/v1/fleet/busy", None, StatusCode::OK)
        .await;
    assert_eq!(busy["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn shortage_requires_a_reason() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/reconcile", order_id),
            Some(json!({
                "otp": otp,
                "good_qty": dec!(28),
                "missing_qty": dec!(2),
                "damaged_qty": dec!(0),
            })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("reason"));
}

#[tokio::test]
async fn shortage_settles_wallet_credit_note_and_balance() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/reconcile", order_id),
            Some(json!({
                "otp": otp,
                "good_qty": dec!(27),
                "missing_qty": dec!(2),
                "damaged_qty": dec!(1),
                "reason": "Two bags lost in transit, one pallet water damaged",
                "liability": "driver",
                "deduction_amount": dec!(2550),
            })),
            StatusCode::OK,
        )
        .await;

    let outcome = &body["data"];
    assert_eq!(outcome["shortage_qty"], json!("3"));
    // (2 + 1) * 850 sale price
    assert_eq!(outcome["credit_note_amount"], json!("2550"));
    assert_eq!(outcome["wallet_deduction"], json!("2550"));
    assert!(outcome["shortage_id"].is_string());

    // Driver wallet went negative by the deduction.
    let wallet = app
        .request_json(
            Method::GET,
            &format!("/api/v1/drivers/{}/wallet/balance", fixture.driver_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(wallet["data"]["balance"], json!("-2550"));

    // Customer is no longer billed for undelivered goods:
    // 25500 receivable - 2550 credit note.
    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("22950"));
}

#[tokio::test]
async fn company_liability_leaves_the_wallet_alone() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/reconcile", order_id),
            Some(json!({
                "otp": otp,
                "good_qty": dec!(29),
                "missing_qty": dec!(1),
                "damaged_qty": dec!(0),
                "reason": "Weighbridge variance",
                "liability": "company",
            })),
            StatusCode::OK,
        )
        .await;
    assert_eq!(body["data"]["wallet_deduction"], json!("0"));

    let wallet = app
        .request_json(
            Method::GET,
            &format!("/api/v1/drivers/{}/wallet/balance", fixture.driver_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(wallet["data"]["balance"], json!("0"));
}

#[tokio::test]
async fn reconciling_twice_conflicts() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    let payload = json!({
        "otp": otp,
        "good_qty": dec!(30),
        "missing_qty": dec!(0),
        "damaged_qty": dec!(0),
    });
    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", order_id),
        Some(payload.clone()),
        StatusCode::OK,
    )
    .await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/reconcile", order_id),
            Some(payload),
            StatusCode::CONFLICT,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("already"));
}

#[tokio::test]
async fn requested_orders_cannot_be_reconciled() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;

    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", order_id),
        Some(json!({
            "otp": "123456",
            "good_qty": dec!(30),
            "missing_qty": dec!(0),
            "damaged_qty": dec!(0),
        })),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
}

#[tokio::test]
async fn negative_deduction_amounts_are_rejected() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/reconcile", order_id),
            Some(json!({
                "otp": otp,
                "good_qty": dec!(28),
                "missing_qty": dec!(2),
                "damaged_qty": dec!(0),
                "reason": "Two bags short at the weighbridge",
                "liability": "driver",
                "deduction_amount": dec!(-1700),
            })),
            StatusCode::BAD_REQUEST,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("negative"));

    // Nothing settled: a rejected deduction leaves the wallet untouched.
    let wallet = app
        .request_json(
            Method::GET,
            &format!("/api/v1/drivers/{}/wallet/balance", fixture.driver_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(wallet["data"]["balance"], json!("0"));
}

#[tokio::test]
async fn a_conflicting_settlement_leaves_balances_alone() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let order_id = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, order_id).await;
    let otp = app.delivery_otp(order_id).await;

    let payload = json!({
        "otp": otp,
        "good_qty": dec!(27),
        "missing_qty": dec!(3),
        "damaged_qty": dec!(0),
        "reason": "Three tons missing on arrival",
        "liability": "driver",
        "deduction_amount": dec!(2550),
    });
    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", order_id),
        Some(payload.clone()),
        StatusCode::OK,
    )
    .await;
    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", order_id),
        Some(payload),
        StatusCode::CONFLICT,
    )
    .await;

    // One credit note, one wallet deduction: the retry settled nothing.
    let balance = app
        .request_json(
            Method::GET,
            &format!("/api/v1/customers/{}/balance", fixture.customer_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(balance["data"]["current_balance"], json!("22950"));

    let wallet = app
        .request_json(
            Method::GET,
            &format!("/api/v1/drivers/{}/wallet/balance", fixture.driver_id),
            None,
            StatusCode::OK,
        )
        .await;
    assert_eq!(wallet["data"]["balance"], json!("-2550"));
}
