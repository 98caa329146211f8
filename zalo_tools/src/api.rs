use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use zmp_common::mac::{sign, CanonicalString};

use crate::{
    config::{MacPurpose, ZaloConfig},
    data_objects::{GetOrderStatusResponse, SettlementChannel, UpdateOrderStatusRequest, UpdateOrderStatusResponse},
    ZaloApiError,
};

/// REST client for the Zalo Mini App payment API.
#[derive(Clone)]
pub struct ZaloPaymentApi {
    config: ZaloConfig,
    client: Arc<Client>,
}

impl ZaloPaymentApi {
    pub fn new(config: ZaloConfig) -> Result<Self, ZaloApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ZaloApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &ZaloConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, ZaloApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ZaloApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await?;
            Err(ZaloApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    fn sign(&self, canonical: &CanonicalString, purpose: MacPurpose) -> Result<String, ZaloApiError> {
        sign(canonical, self.config.key_for(purpose).reveal()).map_err(|e| ZaloApiError::SigningError(e.to_string()))
    }

    /// Queries the gateway for the status of the transaction with the given gateway order id.
    pub async fn get_order_status(&self, order_id: &str) -> Result<GetOrderStatusResponse, ZaloApiError> {
        let canonical = CanonicalString::new()
            .field("appId", &self.config.app_id)
            .field("orderId", order_id)
            .field("privateKey", self.config.private_key.reveal());
        let mac = self.sign(&canonical, MacPurpose::StatusQuery)?;
        let params = [("app_id", self.config.app_id.as_str()), ("order_id", order_id), ("mac", mac.as_str())];
        debug!("💳️ Fetching gateway status for order {order_id}");
        let result = self
            .rest_query::<GetOrderStatusResponse, ()>(Method::GET, "/transaction/get-status", &params, None)
            .await?;
        info!("💳️ Gateway status for {order_id}: error {}, returnCode {}", result.error, result.data.return_code);
        Ok(result)
    }

    pub async fn update_cod_order_status(
        &self,
        order_id: &str,
        result_code: i32,
    ) -> Result<UpdateOrderStatusResponse, ZaloApiError> {
        self.update_order_status(SettlementChannel::Cod, order_id, result_code).await
    }

    pub async fn update_bank_order_status(
        &self,
        order_id: &str,
        result_code: i32,
    ) -> Result<UpdateOrderStatusResponse, ZaloApiError> {
        self.update_order_status(SettlementChannel::Bank, order_id, result_code).await
    }

    /// Pushes a settlement result for a COD or bank-transfer order to the gateway.
    pub async fn update_order_status(
        &self,
        channel: SettlementChannel,
        order_id: &str,
        result_code: i32,
    ) -> Result<UpdateOrderStatusResponse, ZaloApiError> {
        let canonical = CanonicalString::new()
            .field("appId", &self.config.app_id)
            .field("orderId", order_id)
            .field("resultCode", result_code);
        let mac = self.sign(&canonical, MacPurpose::Settlement)?;
        let request = UpdateOrderStatusRequest {
            app_id: self.config.app_id.clone(),
            order_id: order_id.to_string(),
            result_code,
            mac,
        };
        let path = format!("/transaction/{}/{}", self.config.app_id, channel.path_segment());
        debug!("💳️ Pushing {channel} settlement {result_code} for order {order_id}");
        let result = self
            .rest_query::<UpdateOrderStatusResponse, UpdateOrderStatusRequest>(Method::POST, &path, &[], Some(request))
            .await?;
        info!("💳️ {channel} settlement for {order_id} answered with error {}", result.error);
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock,
        MockServer,
        ResponseTemplate,
    };
    use zmp_common::{mac::verify, Secret};

    use super::*;

    fn config(server: &MockServer) -> ZaloConfig {
        ZaloConfig {
            api_url: server.uri(),
            app_id: "3344".into(),
            secret_key: Secret::new("secret".into()),
            private_key: Secret::new("private".into()),
            timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetch_order_status() {
        let _ = env_logger::try_init();
        let server = MockServer::start().await;
        let canonical =
            CanonicalString::new().field("appId", "3344").field("orderId", "ZLP_1").field("privateKey", "private");
        let mac = sign(&canonical, "private").unwrap();
        Mock::given(method("GET"))
            .and(path("/transaction/get-status"))
            .and(query_param("app_id", "3344"))
            .and(query_param("order_id", "ZLP_1"))
            .and(query_param("mac", mac.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": 0,
                "data": { "returnCode": 1, "transId": "T1", "extraData": "{\"pk_order_id\":\"NL1\"}" }
            })))
            .expect(1)
            .mount(&server)
            .await;
        let api = ZaloPaymentApi::new(config(&server)).unwrap();
        let status = api.get_order_status("ZLP_1").await.unwrap();
        assert_eq!(status.error, 0);
        assert_eq!(status.data.return_code, 1);
        assert_eq!(status.data.trans_id, "T1");
        assert_eq!(status.data.extra_data, r#"{"pk_order_id":"NL1"}"#);
    }

    #[tokio::test]
    async fn push_bank_settlement() {
        let _ = env_logger::try_init();
        let server = MockServer::start().await;
        let canonical = CanonicalString::new().field("appId", "3344").field("orderId", "ZLP_2").field("resultCode", 1);
        let mac = sign(&canonical, "secret").unwrap();
        Mock::given(method("POST"))
            .and(path("/transaction/3344/bank-callback-payment"))
            .and(body_json(serde_json::json!({"appId":"3344","orderId":"ZLP_2","resultCode":1,"mac": mac})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error":0,"data":{"returnCode":1,"returnMessage":"ok"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let api = ZaloPaymentApi::new(config(&server)).unwrap();
        let result = api.update_bank_order_status("ZLP_2", 1).await.unwrap();
        assert_eq!(result.error, 0);
        assert_eq!(result.data.return_message, "ok");
        assert!(verify(&canonical, "secret", &mac));
    }

    #[tokio::test]
    async fn cod_settlement_uses_the_cod_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transaction/3344/cod-callback-payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"error":0})))
            .expect(1)
            .mount(&server)
            .await;
        let api = ZaloPaymentApi::new(config(&server)).unwrap();
        let result = api.update_cod_order_status("ZLP_3", -1).await.unwrap();
        assert_eq!(result.error, 0);
    }

    #[tokio::test]
    async fn http_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transaction/get-status"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        let api = ZaloPaymentApi::new(config(&server)).unwrap();
        let err = api.get_order_status("ZLP_4").await.unwrap_err();
        assert!(matches!(err, ZaloApiError::QueryError { status: 502, .. }));
    }

    #[tokio::test]
    async fn slow_gateway_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transaction/get-status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error":0}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        let api = ZaloPaymentApi::new(config(&server)).unwrap();
        let err = api.get_order_status("ZLP_5").await.unwrap_err();
        assert!(matches!(err, ZaloApiError::Timeout(_)), "{err:?}");
    }
}
