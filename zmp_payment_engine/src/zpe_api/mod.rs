//! # Payment engine public API
//!
//! * [`order_flow_api`] turns carts into price-locked orders and builds the gateway checkout payload.
//! * [`payment_flow_api`] authenticates gateway callbacks and reconciles order status with the gateway, including the
//!   deferred status check and the bank-transfer webhook.
//!
//! The pattern for using the APIs is the same. An API instance is created by supplying backends that implement the
//! traits in [`crate::traits`]:
//!
//! ```rust,ignore
//! use zmp_payment_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase is both the order store and the product catalog
//! let api = OrderFlowApi::new(db.clone(), db, options);
//! let created = api.create_order(request).await?;
//! ```
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_flow_api;
pub mod payment_objects;
