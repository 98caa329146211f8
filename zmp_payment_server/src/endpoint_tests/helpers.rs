use actix_web::{http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use log::debug;
use serde::Serialize;
use zmp_common::Amount;
use zmp_payment_engine::db_types::{CustomerInfo, Order, OrderItem, OrderStatusType, ProductSnapshot};

pub async fn get_request<F>(path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    send(TestRequest::get().uri(path), configure).await
}

pub async fn post_request<T, F>(path: &str, payload: &T, configure: F) -> (StatusCode, String)
where
    T: Serialize,
    F: FnOnce(&mut ServiceConfig),
{
    send(TestRequest::post().uri(path).set_json(payload), configure).await
}

pub async fn post_with_header<T, F>(
    path: &str,
    header: (&'static str, &str),
    payload: &T,
    configure: F,
) -> (StatusCode, String)
where
    T: Serialize,
    F: FnOnce(&mut ServiceConfig),
{
    let req = TestRequest::post().uri(path).insert_header((header.0, header.1.to_string())).set_json(payload);
    send(req, configure).await
}

pub async fn post_raw<F>(path: &str, body: &'static str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body);
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn sample_order(id: &str, status: OrderStatusType) -> Order {
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let snapshot = ProductSnapshot {
        product_id: 1,
        name: "T-shirt".to_string(),
        price: Amount::from(50_000),
        description: String::default(),
        image_url: String::default(),
    };
    Order {
        id: id.into(),
        customer_info: CustomerInfo {
            name: "Nguyen Van A".to_string(),
            phone: "0901234567".to_string(),
            address: "1 Le Loi".to_string(),
        },
        total_amount: Amount::from(100_000),
        status,
        transaction_id: None,
        gateway_order_id: None,
        items: vec![OrderItem::new(snapshot, 2)],
        created_at: timestamp,
        updated_at: timestamp,
    }
}
