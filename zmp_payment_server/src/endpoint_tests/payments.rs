use std::sync::Arc;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use serde_json::{json, Value};
use zmp_common::Secret;
use zmp_payment_engine::{
    db_types::{OrderId, OrderStatusType, StatusUpdate},
    payment_objects::PaymentFlowOptions,
    test_utils::{callbacks::*, fakes::RecordingScheduler},
    traits::{SettlementMethod, SettlementResult},
    PaymentFlowApi,
};

use super::{
    helpers::{post_raw, post_request, post_with_header, sample_order},
    mocks::{MockGateway, MockOrderManager},
};
use crate::{
    payment_routes::{BankWebhookRoute, NotifyCallbackRoute, OrderCallbackRoute},
    webhook_auth::WebhookAuth,
};

const WEBHOOK_KEY: &str = "relay-shared-key";

fn payment_routes(
    store: MockOrderManager,
    gateway: MockGateway,
    scheduler: RecordingScheduler,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let options = PaymentFlowOptions {
            app_id: TEST_APP_ID.to_string(),
            notify_key: Secret::new(TEST_NOTIFY_KEY.to_string()),
            order_callback_key: Secret::new(TEST_ORDER_CALLBACK_KEY.to_string()),
        };
        let api = PaymentFlowApi::new(store, gateway, Arc::new(scheduler), options);
        cfg.service(NotifyCallbackRoute::<MockOrderManager, MockGateway>::new())
            .service(OrderCallbackRoute::<MockOrderManager, MockGateway>::new())
            .service(BankWebhookRoute::<MockOrderManager, MockGateway>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(WebhookAuth::new(Secret::new(WEBHOOK_KEY.to_string()))));
    }
}

async fn post_transfer<F>(transfer: &Value, api_key: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let auth = format!("Apikey {api_key}");
    post_with_header("/payment/bank-webhook", ("Authorization", auth.as_str()), transfer, configure).await
}

fn transfer_for(content: &str, amount: i64) -> Value {
    json!({
        "id": 92704,
        "gateway": "Vietcombank",
        "transactionDate": "2024-05-01 10:00:00",
        "accountNumber": "0123456789",
        "content": content,
        "transferType": "in",
        "transferAmount": amount,
        "referenceCode": "FT24122"
    })
}

fn callback_result(body: &str) -> (i64, String) {
    let v: Value = serde_json::from_str(body).unwrap();
    (v["return_code"].as_i64().unwrap(), v["return_message"].as_str().unwrap().to_string())
}

#[actix_web::test]
async fn notify_callback_is_acknowledged_and_scheduled() {
    let scheduler = RecordingScheduler::default();
    let cb = signed_notify_callback("ZLP_1", "BANK", TEST_NOTIFY_KEY);
    let routes = payment_routes(MockOrderManager::new(), MockGateway::new(), scheduler.clone());
    let (status, body) = post_request("/payment/notify-callback", &cb, routes).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(callback_result(&body), (1, "success".to_string()));
    assert_eq!(scheduler.jobs().len(), 1);
    assert_eq!(scheduler.jobs()[0].gateway_order_id, "ZLP_1");
}

#[actix_web::test]
async fn notify_callback_with_bad_mac() {
    let scheduler = RecordingScheduler::default();
    let mut cb = signed_notify_callback("ZLP_1", "BANK", TEST_NOTIFY_KEY);
    cb.data.order_id = "ZLP_2".to_string();
    let routes = payment_routes(MockOrderManager::new(), MockGateway::new(), scheduler.clone());
    let (status, body) = post_request("/payment/notify-callback", &cb, routes).await;
    assert_eq!(status, StatusCode::OK);
    let (code, message) = callback_result(&body);
    assert_eq!(code, -1);
    assert!(message.contains("mac not equal"), "{message}");
    assert!(scheduler.jobs().is_empty());
}

#[actix_web::test]
async fn malformed_callbacks_still_get_200() {
    let routes = payment_routes(MockOrderManager::new(), MockGateway::new(), RecordingScheduler::default());
    let (status, body) = post_raw("/payment/order-callback", "{not json", routes).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(callback_result(&body).0, -1);
}

#[actix_web::test]
async fn order_callback_completes_order() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(Some(sample_order("NL1", OrderStatusType::Pending))));
    store
        .expect_update_order_status()
        .withf(|id: &OrderId, update: &StatusUpdate| {
            id.as_str() == "NL1" &&
                update.expected == OrderStatusType::Pending &&
                update.new_status == OrderStatusType::Completed &&
                update.transaction_id.as_deref() == Some("TX_1") &&
                update.gateway_order_id.as_deref() == Some("ZLP_1")
        })
        .times(1)
        .returning(|_, _| Ok(Some(sample_order("NL1", OrderStatusType::Completed))));
    let cb = signed_order_callback("NL1", "ZLP_1", "TX_1", 1, 100_000, TEST_ORDER_CALLBACK_KEY);
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let (status, body) = post_request("/payment/order-callback", &cb, routes).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(callback_result(&body), (1, "success".to_string()));
}

#[actix_web::test]
async fn order_callback_with_bad_mac_leaves_order_alone() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().never();
    store.expect_update_order_status().never();
    let cb = signed_order_callback("NL1", "ZLP_1", "TX_1", 1, 100_000, TEST_NOTIFY_KEY);
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let (status, body) = post_request("/payment/order-callback", &cb, routes).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(callback_result(&body).0, -1);
}

#[actix_web::test]
async fn order_callback_for_unknown_order() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(None));
    let cb = signed_order_callback("NL_GONE", "ZLP_1", "TX_1", 1, 100_000, TEST_ORDER_CALLBACK_KEY);
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let (status, body) = post_request("/payment/order-callback", &cb, routes).await;
    assert_eq!(status, StatusCode::OK);
    let (code, message) = callback_result(&body);
    assert_eq!(code, -1);
    assert_eq!(message, "Order #NL_GONE not found");
}

#[actix_web::test]
async fn bank_webhook_settles_with_the_gateway() {
    let mut paying = sample_order("NL5", OrderStatusType::Paying);
    paying.gateway_order_id = Some("ZLP_5".to_string());
    let mut completed = paying.clone();
    completed.status = OrderStatusType::Completed;
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(move |_| Ok(Some(paying.clone())));
    store.expect_update_order_status().times(1).returning(move |_, _| Ok(Some(completed.clone())));
    let mut gateway = MockGateway::new();
    gateway
        .expect_push_settlement()
        .withf(|id: &str, method: &SettlementMethod, result: &SettlementResult| {
            id == "ZLP_5" && *method == SettlementMethod::Bank && *result == SettlementResult::Success
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let scheduler = RecordingScheduler::default();
    let transfer = transfer_for("NL5 thanh toan", 100_000);
    let routes = payment_routes(store, gateway, scheduler.clone());
    let (status, body) = post_transfer(&transfer, WEBHOOK_KEY, routes).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let v: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["success"], true);
    assert_eq!(scheduler.jobs().len(), 1);
}

#[actix_web::test]
async fn bank_webhook_errors() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|id: &OrderId| {
        assert_eq!(id.as_str(), "NL404");
        Ok(None)
    });
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let (status, _) = post_transfer(&json!({"content": "NL404"}), WEBHOOK_KEY, routes).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let routes = payment_routes(MockOrderManager::new(), MockGateway::new(), RecordingScheduler::default());
    let (status, _) = post_transfer(&json!({"content": ""}), WEBHOOK_KEY, routes).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn bank_webhook_without_api_key() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().never();
    store.expect_update_order_status().never();
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let (status, body) = post_request("/payment/bank-webhook", &transfer_for("NL5", 100_000), routes).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Missing API key"), "{body}");
}

#[actix_web::test]
async fn bank_webhook_with_wrong_api_key() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().never();
    store.expect_update_order_status().never();
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let (status, body) = post_transfer(&transfer_for("NL5", 100_000), "relay-shared-kez", routes).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Invalid API key"), "{body}");

    let mut store = MockOrderManager::new();
    store.expect_update_order_status().never();
    let routes = payment_routes(store, MockGateway::new(), RecordingScheduler::default());
    let bearer = format!("Bearer {WEBHOOK_KEY}");
    let (status, _) = post_with_header(
        "/payment/bank-webhook",
        ("Authorization", bearer.as_str()),
        &transfer_for("NL5", 100_000),
        routes,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn bank_webhook_rejects_short_transfers() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(Some(sample_order("NL5", OrderStatusType::Paying))));
    store.expect_update_order_status().never();
    let mut gateway = MockGateway::new();
    gateway.expect_push_settlement().never();
    let scheduler = RecordingScheduler::default();
    let routes = payment_routes(store, gateway, scheduler.clone());
    let (status, body) = post_transfer(&transfer_for("NL5 thanh toan", 99_999), WEBHOOK_KEY, routes).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("does not cover"), "{body}");
    assert!(scheduler.jobs().is_empty());
}
