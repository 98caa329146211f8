//! # ZMP payment server
//! The HTTP front end of the Zalo Mini App storefront. It is responsible for:
//! * Creating orders from the mini app's cart and handing back signed checkout parameters.
//! * Receiving payment callbacks from the gateway and bank-transfer webhooks, and reconciling order status.
//! * Re-checking notified payments with the gateway a few minutes later, in a background worker.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/orders`, `/orders/{order_id}`, `/orders/{order_id}/cancel`: Order management for the mini app.
//! * `/payment/notify-callback`, `/payment/order-callback`: Gateway callbacks. These always answer 200.
//! * `/payment/bank-webhook`: Incoming bank transfers. Requires `Authorization: Apikey <ZMP_WEBHOOK_API_KEY>`.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod payment_routes;
pub mod reconciliation_worker;
pub mod routes;
pub mod server;
pub mod webhook_auth;

#[cfg(test)]
mod endpoint_tests;
