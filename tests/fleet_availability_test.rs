mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;

use cemflow_api::entities::compliance_document::FleetEntityType;
use common::TestApp;

async fn available_plates(app: &TestApp) -> Vec<String> {
    let body = app
        .request_json(Method::GET, "/api/v1/fleet/available", None, StatusCode::OK)
        .await;
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["plate_number"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn availability_excludes_inactive_unpaired_and_noncompliant() {
    let app = TestApp::new().await;

    let d1 = app.seed_driver("Driver One", true).await;
    let d2 = app.seed_driver("Driver Two", true).await;
    let d3 = app.seed_driver("Driver Three", false).await;
    let d4 = app.seed_driver("Driver Four", true).await;

    app.seed_truck("AAA-111", Some(d1), true).await;
    // Inactive truck.
    app.seed_truck("BBB-222", Some(d2), false).await;
    // Paired with an inactive driver.
    app.seed_truck("CCC-333", Some(d3), true).await;
    // No driver at all.
    app.seed_truck("DDD-444", None, true).await;
    // Active pair but the truck's roadworthiness certificate expired.
    let t5 = app.seed_truck("EEE-555", Some(d4), true).await;
    app.seed_expired_document(FleetEntityType::Truck, t5, "roadworthiness")
        .await;

    assert_eq!(available_plates(&app).await, vec!["AAA-111".to_string()]);
}

#[tokio::test]
async fn expired_driver_license_blocks_dispatch() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    app.seed_expired_document(FleetEntityType::Driver, fixture.driver_id, "license")
        .await;

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
    assert!(body["message"].as_str().unwrap().contains("compliance"));
}

#[tokio::test]
async fn mismatched_pair_is_rejected() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;
    let stranger = app.seed_driver("Unpaired Driver", true).await;

    let order_id = app.create_order(&fixture, dec!(30)).await;
    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/dispatch", order_id),
            Some(json!({
                "truck_id": fixture.truck_id,
                "driver_id": stranger,
            })),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("not paired"));
}

#[tokio::test]
async fn a_reserved_truck_cannot_be_dispatched_again() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    let first = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, first).await;

    // A second order wants the same truck while it is out.
    let second = app.create_order(&fixture, dec!(20)).await;
    let body = app
        .request_json(
            Method::POST,
            &format!("/api/v1/orders/{}/dispatch", second),
            Some(json!({
                "truck_id": fixture.truck_id,
                "driver_id": fixture.driver_id,
            })),
            StatusCode::CONFLICT,
        )
        .await;
    assert!(body["message"].as_str().unwrap().contains("reserved"));

    // And it disappears from the availability set.
    assert!(available_plates(&app).await.is_empty());
}

#[tokio::test]
async fn released_truck_is_reusable_for_the_next_trip() {
    let app = TestApp::new().await;
    let fixture = app.seed_dispatch_fixture().await;

    let first = app.create_order(&fixture, dec!(30)).await;
    app.dispatch_order(&fixture, first).await;
    let otp = app.delivery_otp(first).await;
    app.request_json(
        Method::POST,
        &format!("/api/v1/orders/{}/reconcile", first),
        Some(json!({
            "otp": otp,
            "good_qty": dec!(30),
            "missing_qty": dec!(0),
            "damaged_qty": dec!(0),
        })),
        StatusCode::OK,
    )
    .await;

    let second = app.create_order(&fixture, dec!(20)).await;
    app.dispatch_order(&fixture, second).await;

    let busy = app
        .request_json(Method::GET, "/api/v1/fleet/busy", None, StatusCode::OK)
        .await;
    assert_eq!(busy["data"].as_array().unwrap().len(), 1);
}
