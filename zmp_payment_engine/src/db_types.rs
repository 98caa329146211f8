use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use zmp_common::Amount;

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created, and the customer has not started paying yet.
    Pending,
    /// The customer has been handed off to the payment gateway.
    Paying,
    /// The gateway has accepted the payment but has not settled it yet.
    Processing,
    /// Payment settled. The order is paid.
    Completed,
    /// The gateway reported the payment as failed.
    Failed,
    /// The order was cancelled before it completed.
    Cancelled,
    /// A completed order whose payment was returned.
    Refunded,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled | Self::Refunded)
    }

    fn progress(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Paying => 1,
            Self::Processing => 2,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Refunded => 3,
        }
    }

    /// The single source of truth for which status changes are allowed.
    ///
    /// Statuses only move forward along `pending -> paying -> processing -> {completed, failed}`, skipping steps is
    /// fine. Any non-terminal order can be cancelled, and a completed order can be refunded. Nothing else leaves a
    /// terminal state, and a status never "transitions" to itself.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        match (*self, next) {
            (current, next) if current == next => false,
            (Completed, Refunded) => true,
            (current, _) if current.is_terminal() => false,
            (_, Cancelled) => true,
            (_, Refunded) => false,
            (current, next) => next.progress() > current.progress(),
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Paying => write!(f, "paying"),
            OrderStatusType::Processing => write!(f, "processing"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Failed => write!(f, "failed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
            OrderStatusType::Refunded => write!(f, "refunded"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paying" => Ok(Self::Paying),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConversionError("Order id cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     CustomerInfo      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

//--------------------------------------    ProductSnapshot    ---------------------------------------------------------
/// A copy of the product as it was when the order was placed. Later catalog edits do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: i64,
    pub name: String,
    pub price: Amount,
    pub description: String,
    pub image_url: String,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone().unwrap_or_default(),
            price: product.price,
            description: product.description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_snapshot: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: Amount,
}

impl OrderItem {
    pub fn new(product_snapshot: ProductSnapshot, quantity: u32) -> Self {
        let unit_price = product_snapshot.price;
        Self { product_snapshot, quantity, unit_price }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_info: CustomerInfo,
    pub total_amount: Amount,
    pub status: OrderStatusType,
    pub transaction_id: Option<String>,
    pub gateway_order_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn has_transaction_id(&self) -> bool {
        self.transaction_id.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_gateway_order_id(&self) -> bool {
        self.gateway_order_id.as_deref().is_some_and(|s| !s.is_empty())
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Locally generated order id. The store's uniqueness constraint is authoritative.
    pub id: OrderId,
    pub customer_info: CustomerInfo,
    /// The sum of `unit_price * quantity` over the items
    pub total_amount: Amount,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(id: OrderId, customer_info: CustomerInfo, total_amount: Amount, items: Vec<OrderItem>) -> Self {
        Self { id, customer_info, total_amount, items, created_at: Utc::now() }
    }
}

//--------------------------------------     StatusUpdate      ---------------------------------------------------------
/// A compare-and-swap status change. It only applies if the order is still in `expected` status.
///
/// `transaction_id` and `gateway_order_id` are only written if the order does not have a value for them yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub expected: OrderStatusType,
    pub new_status: OrderStatusType,
    pub transaction_id: Option<String>,
    pub gateway_order_id: Option<String>,
}

impl StatusUpdate {
    pub fn new(expected: OrderStatusType, new_status: OrderStatusType) -> Self {
        Self { expected, new_status, transaction_id: None, gateway_order_id: None }
    }

    pub fn with_transaction_id<S: Into<String>>(mut self, transaction_id: Option<S>) -> Self {
        self.transaction_id = transaction_id.map(Into::into).filter(|s| !s.is_empty());
        self
    }

    pub fn with_gateway_order_id<S: Into<String>>(mut self, gateway_order_id: Option<S>) -> Self {
        self.gateway_order_id = gateway_order_id.map(Into::into).filter(|s| !s.is_empty());
        self
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: Option<String>,
    pub price: Amount,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Amount,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Amount) -> Self {
        Self { name: Some(name.into()), price, ..Default::default() }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image_url<S: Into<String>>(mut self, image_url: S) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

//--------------------------------------       Pagination      ---------------------------------------------------------
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request. Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
}
