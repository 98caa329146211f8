use serde::{Deserialize, Serialize};
use zmp_common::{mac::CanonicalString, Secret};

use crate::{
    db_types::{Order, OrderStatusType},
    zpe_api::errors::PaymentFlowError,
};

#[derive(Debug, Clone, Default)]
pub struct PaymentFlowOptions {
    /// Callbacks must name this mini app. Left empty, any app id is accepted.
    pub app_id: String,
    /// Verifies payment-notify callbacks
    pub notify_key: Secret<String>,
    /// Verifies order-result callbacks
    pub order_callback_key: Secret<String>,
}

impl PaymentFlowOptions {
    pub fn accepts_app_id(&self, app_id: &str) -> bool {
        self.app_id.is_empty() || self.app_id == app_id
    }
}

//--------------------------------------   Notify callback   ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyCallbackData {
    pub app_id: String,
    pub order_id: String,
    pub method: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyCallback {
    pub data: NotifyCallbackData,
    pub mac: String,
}

impl NotifyCallback {
    pub fn canonical_string(&self) -> CanonicalString {
        CanonicalString::new()
            .field("appId", &self.data.app_id)
            .field("orderId", &self.data.order_id)
            .field("method", &self.data.method)
    }
}

//--------------------------------------   Order callback    ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderCallback {
    pub app_id: String,
    /// The gateway's order id
    pub order_id: String,
    pub trans_id: String,
    pub method: String,
    pub amount: i64,
    pub description: String,
    pub result_code: i64,
    pub message: String,
    #[serde(rename = "extradata")]
    pub extra_data: String,
    pub mac: String,
}

impl OrderCallback {
    pub fn canonical_string(&self) -> CanonicalString {
        CanonicalString::new()
            .field("appId", &self.app_id)
            .field("amount", self.amount)
            .field("description", &self.description)
            .field("orderId", &self.order_id)
            .field("message", &self.message)
            .field("resultCode", self.result_code)
            .field("transId", &self.trans_id)
    }

    pub fn target_status(&self) -> OrderStatusType {
        if self.result_code == 1 {
            OrderStatusType::Completed
        } else {
            OrderStatusType::Failed
        }
    }
}

//--------------------------------------  Callback response  ---------------------------------------------------------
/// The acknowledgement the gateway expects from every callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub return_code: i32,
    pub return_message: String,
}

impl CallbackResponse {
    pub fn success() -> Self {
        Self { return_code: 1, return_message: "success".to_string() }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self { return_code: -1, return_message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        self.return_code == 1
    }
}

impl<T> From<Result<T, PaymentFlowError>> for CallbackResponse {
    fn from(result: Result<T, PaymentFlowError>) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

//--------------------------------------  Bank notification  ---------------------------------------------------------
/// An incoming bank transfer, as posted by the bank-statement webhook provider. The transfer `content` starts with
/// the internal order id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankTransferNotification {
    pub id: i64,
    pub gateway: String,
    pub transaction_date: String,
    pub account_number: String,
    pub code: Option<String>,
    pub content: String,
    pub transfer_type: String,
    pub transfer_amount: i64,
    pub accumulated: i64,
    pub sub_account: Option<String>,
    pub reference_code: String,
    pub description: String,
}

impl BankTransferNotification {
    /// The first word of the transfer content, if any.
    pub fn order_reference(&self) -> Option<&str> {
        self.content.split_whitespace().next()
    }
}

//--------------------------------------  Transition outcome  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The status was changed. Holds the updated order.
    Applied(Order),
    /// The order was already completed. Nothing was written.
    AlreadyCompleted(Order),
    /// The order is already in the requested status. Nothing was written.
    Unchanged(Order),
    /// The state machine does not allow the change. Nothing was written.
    Rejected { order: Order, requested: OrderStatusType },
}

impl TransitionOutcome {
    pub fn order(&self) -> &Order {
        match self {
            Self::Applied(o) | Self::AlreadyCompleted(o) | Self::Unchanged(o) => o,
            Self::Rejected { order, .. } => order,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}
