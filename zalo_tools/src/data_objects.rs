use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Response of `GET /transaction/get-status`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GetOrderStatusResponse {
    pub error: i64,
    #[serde(default)]
    pub data: OrderStatusData,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatusData {
    pub return_code: i64,
    pub return_message: String,
    pub is_processing: bool,
    pub trans_id: String,
    pub method: String,
    pub amount: i64,
    pub trans_time: i64,
    pub merchant_trans_id: String,
    pub extra_data: String,
}

/// Which settlement endpoint an update is pushed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementChannel {
    Cod,
    Bank,
}

impl SettlementChannel {
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Cod => "cod-callback-payment",
            Self::Bank => "bank-callback-payment",
        }
    }
}

impl Display for SettlementChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cod => write!(f, "COD"),
            Self::Bank => write!(f, "BANK"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub app_id: String,
    pub order_id: String,
    /// 1: success, 0: refunded, -1: failed
    pub result_code: i32,
    pub mac: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateOrderStatusResponse {
    pub error: i64,
    #[serde(default)]
    pub data: UpdateOrderStatusData,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrderStatusData {
    pub return_code: i64,
    pub return_message: String,
}
