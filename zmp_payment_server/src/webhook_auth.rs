//! Shared-key authentication for the bank-transfer webhook.
//!
//! The bank relay sends `Authorization: Apikey <key>` with every notification. Handlers that take a
//! [`WebhookApiKey`] argument only run once that header matches the key registered as [`WebhookAuth`] app data.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use log::*;
use zmp_common::{mac::secrets_match, Secret};

use crate::errors::ServerError;

pub const API_KEY_SCHEME: &str = "Apikey ";

#[derive(Clone, Debug)]
pub struct WebhookAuth {
    key: Secret<String>,
}

impl WebhookAuth {
    pub fn new(key: Secret<String>) -> Self {
        Self { key }
    }

    /// Checks the raw value of the `Authorization` header. An unconfigured (empty) key rejects every request.
    pub fn check(&self, authorization: Option<&str>) -> Result<(), ServerError> {
        let provided = authorization.and_then(|h| h.strip_prefix(API_KEY_SCHEME)).map(str::trim);
        let Some(provided) = provided else {
            warn!("🔐️ Webhook request without an API key was rejected");
            return Err(ServerError::Unauthenticated("Missing API key".to_string()));
        };
        if !secrets_match(self.key.reveal(), provided) {
            warn!("🔐️ Webhook request with an invalid API key was rejected");
            return Err(ServerError::Unauthenticated("Invalid API key".to_string()));
        }
        trace!("🔐️ Webhook API key accepted");
        Ok(())
    }
}

/// Extractor proof that the request carried the webhook API key.
#[derive(Debug)]
pub struct WebhookApiKey;

impl FromRequest for WebhookApiKey {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(auth) = req.app_data::<web::Data<WebhookAuth>>() else {
            error!("🔐️ No webhook API key has been registered with the server");
            return ready(Err(ServerError::ConfigurationError("Webhook authentication is not configured".to_string())));
        };
        let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        ready(auth.check(header).map(|_| WebhookApiKey))
    }
}
