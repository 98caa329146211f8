use std::{fmt::Display, str::FromStr, time::Duration};

use log::*;
use zmp_common::Secret;

pub const DEFAULT_ZALO_API_URL: &str = "https://payment-mini.zalo.me/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The merchant account holds two keys. Each payload type is signed with one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacKeyChoice {
    PrivateKey,
    SecretKey,
}

impl FromStr for MacKeyChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" | "private_key" => Ok(Self::PrivateKey),
            "secret" | "secret_key" => Ok(Self::SecretKey),
            _ => Err(format!("Invalid MAC key choice: {s}. Use 'private' or 'secret'")),
        }
    }
}

impl Display for MacKeyChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivateKey => write!(f, "private"),
            Self::SecretKey => write!(f, "secret"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacPurpose {
    /// Inbound payment-notify callbacks
    Notify,
    /// Inbound order (result) callbacks
    OrderCallback,
    /// The checkout payload handed to the mini app
    Checkout,
    /// Outbound transaction status queries
    StatusQuery,
    /// Outbound COD / bank settlement pushes
    Settlement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacKeyPolicy {
    pub notify: MacKeyChoice,
    pub order_callback: MacKeyChoice,
    pub checkout: MacKeyChoice,
    pub status_query: MacKeyChoice,
    pub settlement: MacKeyChoice,
}

impl Default for MacKeyPolicy {
    fn default() -> Self {
        Self {
            notify: MacKeyChoice::PrivateKey,
            order_callback: MacKeyChoice::SecretKey,
            checkout: MacKeyChoice::PrivateKey,
            status_query: MacKeyChoice::PrivateKey,
            settlement: MacKeyChoice::SecretKey,
        }
    }
}

impl MacKeyPolicy {
    pub fn choice_for(&self, purpose: MacPurpose) -> MacKeyChoice {
        match purpose {
            MacPurpose::Notify => self.notify,
            MacPurpose::OrderCallback => self.order_callback,
            MacPurpose::Checkout => self.checkout,
            MacPurpose::StatusQuery => self.status_query,
            MacPurpose::Settlement => self.settlement,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZaloConfig {
    pub api_url: String,
    pub app_id: String,
    pub secret_key: Secret<String>,
    pub private_key: Secret<String>,
    pub timeout: Duration,
    pub mac_keys: MacKeyPolicy,
}

impl Default for ZaloConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ZALO_API_URL.to_string(),
            app_id: String::default(),
            secret_key: Secret::default(),
            private_key: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mac_keys: MacKeyPolicy::default(),
        }
    }
}

impl ZaloConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("ZMP_ZALO_API_URL").unwrap_or_else(|_| {
            info!("🪛️ ZMP_ZALO_API_URL not set, using {DEFAULT_ZALO_API_URL}");
            DEFAULT_ZALO_API_URL.to_string()
        });
        let app_id = std::env::var("ZMP_ZALO_APP_ID").unwrap_or_else(|_| {
            warn!("🪛️ ZMP_ZALO_APP_ID not set. Gateway calls and callback checks will fail.");
            String::default()
        });
        let secret_key = Secret::new(std::env::var("ZMP_ZALO_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ ZMP_ZALO_SECRET_KEY not set. Gateway calls and callback checks will fail.");
            String::default()
        }));
        let private_key = Secret::new(std::env::var("ZMP_ZALO_PRIVATE_KEY").unwrap_or_else(|_| {
            warn!("🪛️ ZMP_ZALO_PRIVATE_KEY not set. Gateway calls and callback checks will fail.");
            String::default()
        }));
        let timeout = std::env::var("ZMP_ZALO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid ZMP_ZALO_TIMEOUT_SECS value: {s}. {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let defaults = MacKeyPolicy::default();
        let mac_keys = MacKeyPolicy {
            notify: key_choice_from_env("ZMP_NOTIFY_MAC_KEY", defaults.notify),
            order_callback: key_choice_from_env("ZMP_ORDER_CALLBACK_MAC_KEY", defaults.order_callback),
            checkout: key_choice_from_env("ZMP_CHECKOUT_MAC_KEY", defaults.checkout),
            status_query: key_choice_from_env("ZMP_STATUS_MAC_KEY", defaults.status_query),
            settlement: key_choice_from_env("ZMP_SETTLEMENT_MAC_KEY", defaults.settlement),
        };
        Self { api_url, app_id, secret_key, private_key, timeout, mac_keys }
    }

    /// The key that signs payloads of the given type.
    pub fn key_for(&self, purpose: MacPurpose) -> &Secret<String> {
        match self.mac_keys.choice_for(purpose) {
            MacKeyChoice::PrivateKey => &self.private_key,
            MacKeyChoice::SecretKey => &self.secret_key,
        }
    }
}

fn key_choice_from_env(var: &str, default: MacKeyChoice) -> MacKeyChoice {
    match std::env::var(var) {
        Ok(s) => s.parse().unwrap_or_else(|e| {
            warn!("🪛️ {e}. {var} falls back to the {default} key.");
            default
        }),
        Err(_) => default,
    }
}
