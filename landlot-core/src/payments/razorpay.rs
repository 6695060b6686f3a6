//! Razorpay implementation of [`PaymentGateway`].

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{GatewayError, PaymentGateway, ProviderOrder};

/// Per-request timeout for the Razorpay HTTP client.
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    /// API base, overridable for test servers. Must end with a slash.
    pub api_base: Url,
}

/// Default Razorpay API base.
#[allow(clippy::unwrap_used)]
pub fn default_api_base() -> Url {
    // Static string, cannot fail to parse.
    Url::parse("https://api.razorpay.com/").unwrap()
}

pub struct RazorpayGateway {
    config: RazorpayConfig,
    orders_url: String,
    client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Self {
        let orders_url = format!("{}v1/orders", config.api_base);
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            orders_url,
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<ProviderOrder, GatewayError> {
        let response = self
            .client
            .post(&self.orders_url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&serde_json::json!({
                "amount": amount_paise,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let order: RazorpayOrder = response.json().await?;
        Ok(ProviderOrder {
            provider_order_id: order.id,
            amount_paise: order.amount,
            currency: order.currency,
        })
    }

    fn verify_signature(
        &self,
        provider_order_id: &str,
        provider_payment_id: &str,
        signature: &str,
    ) -> bool {
        landlot_sdk::signature::verify_payment_signature(
            self.config.key_secret.as_bytes(),
            provider_order_id,
            provider_payment_id,
            signature,
        )
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> RazorpayGateway {
        RazorpayGateway::new(RazorpayConfig {
            key_id: "rzp_test_key".into(),
            key_secret: "test_key_secret".into(),
            api_base: default_api_base(),
        })
    }

    #[test]
    fn orders_url_is_assembled_from_base() {
        assert_eq!(gateway().orders_url, "https://api.razorpay.com/v1/orders");
    }

    #[test]
    fn signature_round_trip_verifies() {
        let sig = landlot_sdk::signature::payment_signature(
            b"test_key_secret",
            "order_abc",
            "pay_abc",
        );
        assert!(gateway().verify_signature("order_abc", "pay_abc", &sig));
        assert!(!gateway().verify_signature("order_abc", "pay_other", &sig));
    }
}
