use serde::{Deserialize, Serialize};

/// What the gateway reports about a single transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayTransactionStatus {
    /// Non-zero when the query itself failed
    pub error: i64,
    /// 1: paid, 0: pending, -1: failed
    pub return_code: i64,
    pub return_message: String,
    pub is_processing: bool,
    pub transaction_id: String,
    /// The opaque correlation blob that was attached at checkout
    pub extra_data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementResult {
    Success,
    Refunded,
    Failed,
}

impl SettlementResult {
    pub fn result_code(&self) -> i32 {
        match self {
            Self::Success => 1,
            Self::Refunded => 0,
            Self::Failed => -1,
        }
    }
}
