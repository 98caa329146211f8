use std::fmt::Display;

use serde::{Deserialize, Serialize};
use zmp_common::Secret;

use crate::db_types::{CustomerInfo, Order};

#[derive(Debug, Clone, Default)]
pub struct OrderFlowOptions {
    /// Signs the checkout payload handed to the mini app
    pub checkout_key: Secret<String>,
}

impl OrderFlowOptions {
    pub fn new(checkout_key: Secret<String>) -> Self {
        Self { checkout_key }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CartItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}

/// The gateway's identifier for a payment method, e.g. `COD`, `BANK` or `ZALOPAY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(pub String);

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S: Into<String>> From<S> for PaymentMethod {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_info: CustomerInfo,
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// A line of the checkout `item` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMethod {
    pub id: String,
    #[serde(rename = "isCustom")]
    pub is_custom: bool,
}

/// Parameters for the mini app's gateway checkout call.
///
/// `mac` covers `amount`, `desc`, `extradata`, `item` and `method`, in that order, with `item` and `method` in their
/// compact JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutParams {
    pub amount: i64,
    pub desc: String,
    pub item: Vec<CheckoutItem>,
    pub extradata: String,
    pub method: CheckoutMethod,
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order: Order,
    pub payment: Option<CheckoutParams>,
}
