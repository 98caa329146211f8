use async_trait::async_trait;
use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, OrderPage, Pagination, StatusUpdate};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("An order with id {0} already exists")]
    DuplicateOrderId(OrderId),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Stored order data could not be read: {0}")]
    CorruptedRecord(String),
}

/// The `OrderManagement` trait defines the behaviour of the order store.
///
/// Orders are never deleted, and apart from the status fields they are never modified after insertion.
#[async_trait]
pub trait OrderManagement: Send + Sync {
    /// Stores a new order with its items in a single transaction.
    ///
    /// The order id must be unique. A clash is reported as [`OrderStoreError::DuplicateOrderId`] and nothing is
    /// written.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches a page of orders, newest first, along with the total number of orders.
    async fn fetch_orders(&self, pagination: Pagination) -> Result<OrderPage, OrderStoreError>;

    /// Atomically applies `update` if, and only if, the order's current status is `update.expected`.
    ///
    /// Returns the updated order, or `None` if the precondition did not hold (another writer got there first, or the
    /// order does not exist). `updated_at` is refreshed on every successful update.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        update: StatusUpdate,
    ) -> Result<Option<Order>, OrderStoreError>;
}
