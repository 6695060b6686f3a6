//! TOML file configuration structures.
//!
//! These structs directly map to the `landlot-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub messaging: MessagingConfig,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Outbound messaging (Twilio) configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Channel-qualified sending address, e.g. `whatsapp:+14155238886`.
    pub from_address: String,
    #[serde(default = "landlot_core::messaging::twilio::default_api_base")]
    pub api_base: Url,
}

/// Payment gateway (Razorpay) configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    #[serde(default = "landlot_core::payments::razorpay::default_api_base")]
    pub api_base: Url,
    /// Fee charged per listing, in whole rupees, when the order request
    /// does not carry an explicit amount.
    #[serde(default = "default_listing_fee_inr")]
    pub listing_fee_inr: i64,
}

fn default_listing_fee_inr() -> i64 {
    299
}

/// Broadcast fanout tuning section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_max_concurrent_sends")]
    pub max_concurrent_sends: usize,
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

fn default_max_concurrent_sends() -> usize {
    8
}

fn default_send_timeout_secs() -> u64 {
    15
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sends: default_max_concurrent_sends(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[messaging]
account_sid = "AC123"
auth_token = "token"
from_address = "whatsapp:+14155238886"

[payment]
key_id = "rzp_test_key"
key_secret = "rzp_test_secret"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.messaging.account_sid, "AC123");
        assert_eq!(
            config.messaging.api_base.as_str(),
            "https://api.twilio.com/"
        );
        assert_eq!(config.payment.listing_fee_inr, 299);
        assert_eq!(config.broadcast.max_concurrent_sends, 8);
        assert!(!config.is_admin_secret_hashed());
    }

    #[test]
    fn test_hashed_secret_detection() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "$argon2id$v=19$m=19456,t=2,p=1$abc123"

[messaging]
account_sid = "AC123"
auth_token = "token"
from_address = "whatsapp:+14155238886"

[payment]
key_id = "rzp_test_key"
key_secret = "rzp_test_secret"

[broadcast]
max_concurrent_sends = 4
send_timeout_secs = 5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.is_admin_secret_hashed());
        assert_eq!(config.broadcast.max_concurrent_sends, 4);
    }
}
