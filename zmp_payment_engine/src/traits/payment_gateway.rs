use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traits::data_objects::{GatewayTransactionStatus, SettlementResult};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    #[error("The payment gateway response could not be understood: {0}")]
    InvalidResponse(String),
}

/// Offline payment methods whose result the merchant reports back to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementMethod {
    Cod,
    Bank,
}

impl Display for SettlementMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "COD"),
            Self::Bank => write!(f, "BANK"),
        }
    }
}

/// Outbound calls to the payment gateway. Implementations must bound every call with a timeout.
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    /// Fetches the current status of the transaction that the gateway knows as `gateway_order_id`.
    async fn fetch_transaction_status(&self, gateway_order_id: &str) -> Result<GatewayTransactionStatus, GatewayError>;

    /// Reports the outcome of a COD or bank-transfer payment to the gateway.
    async fn push_settlement(
        &self,
        gateway_order_id: &str,
        method: SettlementMethod,
        result: SettlementResult,
    ) -> Result<(), GatewayError>;
}
