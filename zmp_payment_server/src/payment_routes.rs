//! The gateway retries callbacks that are not answered with HTTP 200, so the callback handlers always answer 200 and
//! report failures in the `return_code` of the body. Bodies are parsed here rather than by actix for the same reason.

use actix_web::{web, HttpResponse};
use log::*;
use serde::de::DeserializeOwned;
use zmp_payment_engine::{
    payment_objects::{BankTransferNotification, CallbackResponse, NotifyCallback, OrderCallback},
    traits::{OrderManagement, PaymentGatewayClient},
    PaymentFlowApi,
};

use crate::{data_objects::JsonResponse, errors::ServerError, route, webhook_auth::WebhookApiKey};

fn parse_callback<T: DeserializeOwned>(body: &[u8]) -> Result<T, CallbackResponse> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("💻️🔔️ Could not parse callback body. {e}");
        CallbackResponse::failure(format!("Malformed payload: {e}"))
    })
}

route!(notify_callback => Post "/payment/notify-callback" impl OrderManagement, PaymentGatewayClient);
pub async fn notify_callback<B, G>(body: web::Bytes, api: web::Data<PaymentFlowApi<B, G>>) -> HttpResponse
where
    B: OrderManagement,
    G: PaymentGatewayClient,
{
    trace!("💻️🔔️ Received payment notification");
    let response = match parse_callback::<NotifyCallback>(&body) {
        Ok(payload) => api.process_notify_callback(payload).await,
        Err(response) => response,
    };
    debug!("💻️🔔️ Notify callback answered with {}: {}", response.return_code, response.return_message);
    HttpResponse::Ok().json(response)
}

route!(order_callback => Post "/payment/order-callback" impl OrderManagement, PaymentGatewayClient);
pub async fn order_callback<B, G>(body: web::Bytes, api: web::Data<PaymentFlowApi<B, G>>) -> HttpResponse
where
    B: OrderManagement,
    G: PaymentGatewayClient,
{
    trace!("💻️🔔️ Received order callback");
    let response = match parse_callback::<OrderCallback>(&body) {
        Ok(payload) => api.process_order_callback(payload).await,
        Err(response) => response,
    };
    debug!("💻️🔔️ Order callback answered with {}: {}", response.return_code, response.return_message);
    HttpResponse::Ok().json(response)
}

route!(bank_webhook => Post "/payment/bank-webhook" impl OrderManagement, PaymentGatewayClient);
/// Incoming bank transfers. Unlike the gateway callbacks, failures here are reported with proper status codes.
/// The API key is checked before the body is parsed.
pub async fn bank_webhook<B, G>(
    _key: WebhookApiKey,
    body: web::Json<BankTransferNotification>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    G: PaymentGatewayClient,
{
    let notification = body.into_inner();
    trace!("💻️🏦️ Received bank transfer {}", notification.id);
    let outcome = api.process_bank_transfer(notification).await?;
    let order = outcome.order();
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {} is {}", order.id.as_str(), order.status))))
}
