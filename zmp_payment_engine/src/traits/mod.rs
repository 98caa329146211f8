//! # Backend contracts
//!
//! The engine is written against three collaborators and never talks to a concrete database or gateway directly.
//!
//! * [`OrderManagement`] is the order store: create, fetch, list and a compare-and-swap status update.
//! * [`ProductCatalog`] is a read-only product lookup used to price and snapshot cart items.
//! * [`PaymentGatewayClient`] queries the payment gateway for a transaction's status and pushes settlement results.
//!
//! [`crate::SqliteDatabase`] implements the first two. The gateway client is implemented by the server against the
//! Zalo payment API.
mod order_management;
mod payment_gateway;
mod product_catalog;

mod data_objects;

pub use data_objects::{GatewayTransactionStatus, SettlementResult};
pub use order_management::{OrderManagement, OrderStoreError};
pub use payment_gateway::{GatewayError, PaymentGatewayClient, SettlementMethod};
pub use product_catalog::{CatalogError, ProductCatalog};
