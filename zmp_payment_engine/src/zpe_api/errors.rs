use thiserror::Error;
use zmp_common::{extra_data::ExtraDataError, mac::MacError, AmountError};

use crate::{
    db_types::{OrderId, OrderStatusType},
    traits::{CatalogError, GatewayError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("Message authentication failed: {0}")]
    Unauthenticated(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("The payment gateway is unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Could not persist changes: {0}")]
    PersistenceFailure(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    IllegalTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
}

impl From<OrderStoreError> for PaymentFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::DuplicateOrderId(id) => Self::Conflict(format!("Order {id} already exists")),
            e => Self::PersistenceFailure(e.to_string()),
        }
    }
}

impl From<CatalogError> for PaymentFlowError {
    fn from(e: CatalogError) -> Self {
        Self::PersistenceFailure(e.to_string())
    }
}

impl From<GatewayError> for PaymentFlowError {
    fn from(e: GatewayError) -> Self {
        Self::UpstreamUnavailable(e.to_string())
    }
}

impl From<ExtraDataError> for PaymentFlowError {
    fn from(e: ExtraDataError) -> Self {
        Self::MalformedPayload(e.to_string())
    }
}

impl From<AmountError> for PaymentFlowError {
    fn from(e: AmountError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<MacError> for PaymentFlowError {
    fn from(e: MacError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}
