use std::{env, time::Duration};

use log::*;
use zalo_tools::{MacPurpose, ZaloConfig};
use zmp_common::Secret;
use zmp_payment_engine::{order_objects::OrderFlowOptions, payment_objects::PaymentFlowOptions};

const DEFAULT_ZMP_HOST: &str = "127.0.0.1";
const DEFAULT_ZMP_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/zmp_store.db";
const DEFAULT_RECONCILIATION_DELAY: Duration = Duration::from_secs(300);
const DEFAULT_RECONCILIATION_BUFFER: usize = 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Merchant account and gateway client settings
    pub zalo: ZaloConfig,
    /// How long after a payment notification the gateway is asked for the final transaction status.
    pub reconciliation_delay: Duration,
    /// The number of deferred checks that can be waiting to be picked up by the scheduler.
    pub reconciliation_buffer: usize,
    /// Shared key the bank relay presents as `Authorization: Apikey <key>`. When empty, every bank webhook is refused.
    pub webhook_api_key: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ZMP_HOST.to_string(),
            port: DEFAULT_ZMP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            zalo: ZaloConfig::default(),
            reconciliation_delay: DEFAULT_RECONCILIATION_DELAY,
            reconciliation_buffer: DEFAULT_RECONCILIATION_BUFFER,
            webhook_api_key: Secret::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ZMP_HOST").ok().unwrap_or_else(|| DEFAULT_ZMP_HOST.into());
        let port = env::var("ZMP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for ZMP_PORT. {e} Using the default, {DEFAULT_ZMP_PORT}, instead."
                    );
                    DEFAULT_ZMP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_ZMP_PORT);
        let database_url = env::var("ZMP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ ZMP_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let zalo = ZaloConfig::new_from_env_or_default();
        let reconciliation_delay = configure_reconciliation_delay();
        let webhook_api_key = env::var("ZMP_WEBHOOK_API_KEY").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| {
            warn!("🪛️ ZMP_WEBHOOK_API_KEY is not set. All bank webhook requests will be rejected.");
            String::default()
        });
        Self {
            host,
            port,
            database_url,
            zalo,
            reconciliation_delay,
            reconciliation_buffer: DEFAULT_RECONCILIATION_BUFFER,
            webhook_api_key: Secret::new(webhook_api_key),
        }
    }

    /// The keys and ids the payment flows need, resolved according to the MAC key policy.
    pub fn payment_flow_options(&self) -> PaymentFlowOptions {
        PaymentFlowOptions {
            app_id: self.zalo.app_id.clone(),
            notify_key: self.zalo.key_for(MacPurpose::Notify).clone(),
            order_callback_key: self.zalo.key_for(MacPurpose::OrderCallback).clone(),
        }
    }

    pub fn order_flow_options(&self) -> OrderFlowOptions {
        OrderFlowOptions::new(self.zalo.key_for(MacPurpose::Checkout).clone())
    }
}

fn configure_reconciliation_delay() -> Duration {
    env::var("ZMP_RECONCILIATION_DELAY_SECS")
        .map_err(|_| {
            info!(
                "🪛️ ZMP_RECONCILIATION_DELAY_SECS is not set. Using the default value of {}s.",
                DEFAULT_RECONCILIATION_DELAY.as_secs()
            )
        })
        .and_then(|s| {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for ZMP_RECONCILIATION_DELAY_SECS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_RECONCILIATION_DELAY)
}
