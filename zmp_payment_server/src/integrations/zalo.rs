use async_trait::async_trait;
use log::*;
use zalo_tools::{GetOrderStatusResponse, SettlementChannel, ZaloApiError, ZaloConfig, ZaloPaymentApi};
use zmp_payment_engine::traits::{
    GatewayError,
    GatewayTransactionStatus,
    PaymentGatewayClient,
    SettlementMethod,
    SettlementResult,
};

/// The Zalo payment gateway, as seen by the payment engine.
#[derive(Clone)]
pub struct ZaloGateway {
    api: ZaloPaymentApi,
}

impl ZaloGateway {
    pub fn new(config: ZaloConfig) -> Result<Self, ZaloApiError> {
        let api = ZaloPaymentApi::new(config)?;
        Ok(Self { api })
    }
}

fn gateway_error(e: ZaloApiError) -> GatewayError {
    match e {
        ZaloApiError::JsonError(s) => GatewayError::InvalidResponse(s),
        ZaloApiError::QueryError { status, message } if status < 500 => {
            GatewayError::Rejected(format!("{status}. {message}"))
        },
        e => GatewayError::Unavailable(e.to_string()),
    }
}

fn transaction_status(resp: GetOrderStatusResponse) -> GatewayTransactionStatus {
    GatewayTransactionStatus {
        error: resp.error,
        return_code: resp.data.return_code,
        return_message: resp.data.return_message,
        is_processing: resp.data.is_processing,
        transaction_id: resp.data.trans_id,
        extra_data: resp.data.extra_data,
    }
}

#[async_trait]
impl PaymentGatewayClient for ZaloGateway {
    async fn fetch_transaction_status(&self, gateway_order_id: &str) -> Result<GatewayTransactionStatus, GatewayError> {
        let resp = self.api.get_order_status(gateway_order_id).await.map_err(gateway_error)?;
        Ok(transaction_status(resp))
    }

    async fn push_settlement(
        &self,
        gateway_order_id: &str,
        method: SettlementMethod,
        result: SettlementResult,
    ) -> Result<(), GatewayError> {
        let channel = match method {
            SettlementMethod::Cod => SettlementChannel::Cod,
            SettlementMethod::Bank => SettlementChannel::Bank,
        };
        let resp = self
            .api
            .update_order_status(channel, gateway_order_id, result.result_code())
            .await
            .map_err(gateway_error)?;
        if resp.error != 0 {
            warn!("💳️ Gateway refused the {method} settlement for {gateway_order_id}. Error {}", resp.error);
            return Err(GatewayError::Rejected(format!("error {}: {}", resp.error, resp.data.return_message)));
        }
        Ok(())
    }
}
