//! ZMP Payment Engine
//!
//! The payment engine holds the order and payment reconciliation logic of the Zalo Mini App storefront. It is
//! independent of the HTTP layer and of any concrete payment gateway client.
//!
//! The library is divided into these sections:
//! 1. Database management ([`mod@db`]). SQLite is the supported backend. The data types stored in the database are
//!    defined in [`mod@db_types`] and are public.
//! 2. The backend contracts ([`mod@traits`]): the order store, the product catalog and the payment gateway client.
//! 3. The public API ([`mod@zpe_api`]). [`OrderFlowApi`] creates orders and prepares gateway checkouts.
//!    [`PaymentFlowApi`] authenticates gateway callbacks and reconciles order status.
//! 4. Deferred work ([`mod@scheduler`]), used to re-check the gateway some minutes after a payment notification.
mod db;

pub mod db_types;
pub mod helpers;
pub mod scheduler;
pub mod traits;
pub mod zpe_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use zpe_api::{
    errors::PaymentFlowError,
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_flow_api::PaymentFlowApi,
    payment_objects,
};
