use zmp_common::{extra_data::encode_order_reference, mac::sign};

use crate::zpe_api::payment_objects::{NotifyCallback, NotifyCallbackData, OrderCallback};

pub const TEST_APP_ID: &str = "1234567890";
pub const TEST_NOTIFY_KEY: &str = "notify-private-key";
pub const TEST_ORDER_CALLBACK_KEY: &str = "order-callback-secret-key";
pub const TEST_CHECKOUT_KEY: &str = "checkout-private-key";

pub fn signed_notify_callback(gateway_order_id: &str, method: &str, key: &str) -> NotifyCallback {
    let mut cb = NotifyCallback {
        data: NotifyCallbackData {
            app_id: TEST_APP_ID.to_string(),
            order_id: gateway_order_id.to_string(),
            method: method.to_string(),
        },
        mac: String::default(),
    };
    cb.mac = sign(&cb.canonical_string(), key).expect("signing failed");
    cb
}

/// An order callback for the internal order `order_id`, signed with `key`.
pub fn signed_order_callback(
    order_id: &str,
    gateway_order_id: &str,
    trans_id: &str,
    result_code: i64,
    amount: i64,
    key: &str,
) -> OrderCallback {
    let mut cb = OrderCallback {
        app_id: TEST_APP_ID.to_string(),
        order_id: gateway_order_id.to_string(),
        trans_id: trans_id.to_string(),
        method: "ZALOPAY".to_string(),
        amount,
        description: format!("Payment for order {order_id}"),
        result_code,
        message: if result_code == 1 { "Success".to_string() } else { "Failed".to_string() },
        extra_data: encode_order_reference(order_id),
        mac: String::default(),
    };
    cb.mac = sign(&cb.canonical_string(), key).expect("signing failed");
    cb
}
