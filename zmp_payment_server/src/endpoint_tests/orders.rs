use std::sync::Arc;

use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::{json, Value};
use zmp_common::{Amount, Secret};
use zmp_payment_engine::{
    db_types::{Order, OrderPage, OrderStatusType, Product},
    order_objects::OrderFlowOptions,
    payment_objects::PaymentFlowOptions,
    test_utils::fakes::RecordingScheduler,
    traits::OrderStoreError,
    OrderFlowApi,
    PaymentFlowApi,
};

use super::{
    helpers::{get_request, post_request, sample_order},
    mocks::{MockGateway, MockOrderManager, MockProductCatalog},
};
use crate::routes::{health, CancelOrderRoute, CreateOrderRoute, ListOrdersRoute, OrderByIdRoute};

fn t_shirt() -> Product {
    Product {
        id: 1,
        name: Some("T-shirt".to_string()),
        price: Amount::from(50_000),
        description: None,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn order_routes(store: MockOrderManager, catalog: MockProductCatalog) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(store, catalog, OrderFlowOptions::new(Secret::new("checkout".to_string())));
        cfg.service(CreateOrderRoute::<MockOrderManager, MockProductCatalog>::new())
            .service(ListOrdersRoute::<MockOrderManager, MockProductCatalog>::new())
            .service(OrderByIdRoute::<MockOrderManager, MockProductCatalog>::new())
            .service(health)
            .app_data(web::Data::new(api));
    }
}

fn cancel_routes(store: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentFlowApi::new(
            store,
            MockGateway::new(),
            Arc::new(RecordingScheduler::default()),
            PaymentFlowOptions::default(),
        );
        cfg.service(CancelOrderRoute::<MockOrderManager, MockGateway>::new()).app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn health_check() {
    let (status, body) =
        get_request("/health", order_routes(MockOrderManager::new(), MockProductCatalog::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn create_order() {
    let mut store = MockOrderManager::new();
    store.expect_insert_order().times(1).returning(|new_order| {
        assert_eq!(new_order.total_amount, Amount::from(100_000));
        let mut order = sample_order(new_order.id.as_str(), OrderStatusType::Pending);
        order.items = new_order.items;
        Ok(order)
    });
    let mut catalog = MockProductCatalog::new();
    catalog.expect_fetch_product().returning(|id| Ok((id == 1).then(t_shirt)));
    let payload = json!({
        "customer_info": {"name": "Nguyen Van A", "phone": "0901234567", "address": "1 Le Loi"},
        "items": [{"product_id": 1, "quantity": 2}],
        "payment_method": "COD"
    });
    let (status, body) = post_request("/orders", &payload, order_routes(store, catalog)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let created: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(created["order"]["total_amount"], 100_000);
    assert_eq!(created["order"]["status"], "pending");
    assert_eq!(created["order"]["items"][0]["product_snapshot"]["name"], "T-shirt");
    assert_eq!(created["payment"]["amount"], 100_000);
    assert_eq!(created["payment"]["method"], json!({"id": "COD", "isCustom": false}));
    assert_eq!(created["payment"]["mac"].as_str().map(str::len), Some(64));
}

#[actix_web::test]
async fn create_order_with_unknown_product() {
    let mut store = MockOrderManager::new();
    store.expect_insert_order().never();
    let mut catalog = MockProductCatalog::new();
    catalog.expect_fetch_product().returning(|_| Ok(None));
    let payload = json!({"customer_info": {}, "items": [{"product_id": 7, "quantity": 1}]});
    let (status, body) = post_request("/orders", &payload, order_routes(store, catalog)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Product #7"}"#);
}

#[actix_web::test]
async fn create_order_with_empty_cart() {
    let payload = json!({"customer_info": {"name": "A", "phone": "1", "address": "B"}, "items": []});
    let (status, _) =
        post_request("/orders", &payload, order_routes(MockOrderManager::new(), MockProductCatalog::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_order_id_is_a_conflict() {
    let mut store = MockOrderManager::new();
    store.expect_insert_order().returning(|o| Err(OrderStoreError::DuplicateOrderId(o.id)));
    let mut catalog = MockProductCatalog::new();
    catalog.expect_fetch_product().returning(|_| Ok(Some(t_shirt())));
    let payload = json!({"customer_info": {}, "items": [{"product_id": 1, "quantity": 1}]});
    let (status, _) = post_request("/orders", &payload, order_routes(store, catalog)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn fetch_order() {
    let mut store = MockOrderManager::new();
    store
        .expect_fetch_order_by_id()
        .returning(|id| Ok((id.as_str() == "NL1").then(|| sample_order("NL1", OrderStatusType::Completed))));
    let (status, body) = get_request("/orders/NL1", order_routes(store, MockProductCatalog::new())).await;
    assert_eq!(status, StatusCode::OK);
    let order: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(order, sample_order("NL1", OrderStatusType::Completed));
}

#[actix_web::test]
async fn fetch_unknown_order() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, _) = get_request("/orders/NL404", order_routes(store, MockProductCatalog::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn list_orders() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_orders().times(1).returning(|p| {
        assert_eq!(p.page, 2);
        assert_eq!(p.size, 100);
        Ok(OrderPage {
            items: vec![sample_order("NL2", OrderStatusType::Pending)],
            total: 101,
            page: p.page,
            size: p.size,
        })
    });
    let (status, body) = get_request("/orders?page=2&size=500", order_routes(store, MockProductCatalog::new())).await;
    assert_eq!(status, StatusCode::OK);
    let page: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(page["total"], 101);
    assert_eq!(page["page"], 2);
    assert_eq!(page["size"], 100);
    assert_eq!(page["items"][0]["id"], "NL2");
}

#[actix_web::test]
async fn cancel_pending_order() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(Some(sample_order("NL3", OrderStatusType::Pending))));
    store
        .expect_update_order_status()
        .times(1)
        .returning(|_, update| Ok(Some(sample_order("NL3", update.new_status))));
    let (status, body) = post_request("/orders/NL3/cancel", &json!({}), cancel_routes(store)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "cancelled");
}

#[actix_web::test]
async fn cancel_completed_order() {
    let mut store = MockOrderManager::new();
    store.expect_fetch_order_by_id().returning(|_| Ok(Some(sample_order("NL4", OrderStatusType::Completed))));
    store.expect_update_order_status().never();
    let (status, body) = post_request("/orders/NL4/cancel", &json!({}), cancel_routes(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("cannot move from completed to cancelled"), "{body}");
}
