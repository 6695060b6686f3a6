//! Twilio implementation of [`MessageSender`].
//!
//! Posts one form-encoded message to the Twilio Messages API per call,
//! authenticated with the account SID and auth token.

use async_trait::async_trait;
use url::Url;

use super::{MessageSender, SendError};

/// Per-request timeout for the Twilio HTTP client.
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Channel-qualified sending address, e.g. `whatsapp:+14155238886`.
    pub from_address: String,
    /// API base, overridable for test servers. Must end with a slash.
    pub api_base: Url,
}

/// Default Twilio API base.
#[allow(clippy::unwrap_used)]
pub fn default_api_base() -> Url {
    // Static string, cannot fail to parse.
    Url::parse("https://api.twilio.com/").unwrap()
}

pub struct TwilioSender {
    config: TwilioConfig,
    messages_url: String,
    client: reqwest::Client,
}

impl TwilioSender {
    pub fn new(config: TwilioConfig) -> Self {
        let messages_url = format!(
            "{}2010-04-01/Accounts/{}/Messages.json",
            config.api_base, config.account_sid
        );
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            messages_url,
            client,
        }
    }
}

#[async_trait]
impl MessageSender for TwilioSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        let form = [
            ("From", self.config.from_address.as_str()),
            ("To", to),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_is_assembled_from_base_and_sid() {
        let sender = TwilioSender::new(TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "token".into(),
            from_address: "whatsapp:+14155238886".into(),
            api_base: default_api_base(),
        });
        assert_eq!(
            sender.messages_url,
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
