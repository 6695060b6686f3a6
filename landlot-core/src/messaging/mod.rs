//! Messaging provider seam.
//!
//! One implementation per provider; the broadcaster only sees
//! [`MessageSender`] and treats any non-success outcome, timeouts
//! included, as a per-recipient failure.

pub mod twilio;

use async_trait::async_trait;

/// Errors from a single message dispatch.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("provider request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("send timed out")]
    TimedOut,
}

/// Sends a single message to a single address.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError>;
}

/// Qualify a phone number as a WhatsApp contact address.
///
/// Strips spaces, dashes and parentheses; a bare national number is left
/// as-is apart from the channel prefix, so callers should store numbers
/// in E.164 form.
pub fn whatsapp_address(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if let Some(rest) = cleaned.strip_prefix("whatsapp:") {
        format!("whatsapp:{rest}")
    } else {
        format!("whatsapp:{cleaned}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifies_plain_number() {
        assert_eq!(whatsapp_address("+91 98765 43210"), "whatsapp:+919876543210");
    }

    #[test]
    fn strips_formatting_characters() {
        assert_eq!(whatsapp_address("(+91) 98765-43210"), "whatsapp:+919876543210");
    }

    #[test]
    fn already_qualified_address_is_unchanged() {
        assert_eq!(
            whatsapp_address("whatsapp:+919876543210"),
            "whatsapp:+919876543210"
        );
    }
}
