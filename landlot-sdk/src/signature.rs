//! Payment-signature verification.
//!
//! The payment gateway signs its checkout callback as
//!
//! ```text
//! signature = hex(HMAC-SHA256("{provider_order_id}|{provider_payment_id}", key_secret))
//! ```
//!
//! and the server recomputes the digest and compares it in constant time.
//! A confirmation is only ever acted on after this check passes.

/// Header name for admin API authentication.
pub const ADMIN_AUTH_HEADER: &str = "X-Landlot-Admin";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature")]
    SignatureMismatch,
}

/// Compute the hex-encoded payment signature for an order/payment pair.
pub fn payment_signature(
    key_secret: &[u8],
    provider_order_id: &str,
    provider_payment_id: &str,
) -> String {
    let data = format!("{provider_order_id}|{provider_payment_id}");
    let tag = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key_secret),
        data.as_bytes(),
    );
    hex_encode(tag.as_ref())
}

/// Verify a hex-encoded payment signature in constant time.
///
/// Case of the supplied hex digits is ignored; gateways commonly send
/// lowercase but dashboards re-paste uppercase.
pub fn verify_payment_signature(
    key_secret: &[u8],
    provider_order_id: &str,
    provider_payment_id: &str,
    signature: &str,
) -> Result<(), SignatureError> {
    let expected = payment_signature(key_secret, provider_order_id, provider_payment_id);
    let presented = signature.to_ascii_lowercase();
    ring::constant_time::verify_slices_are_equal(expected.as_bytes(), presented.as_bytes())
        .map_err(|_| SignatureError::SignatureMismatch)
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_key_secret";
    const ORDER: &str = "order_Landlot001";
    const PAYMENT: &str = "pay_Landlot001";
    // Independently computed HMAC-SHA256 of "order_Landlot001|pay_Landlot001".
    const KNOWN_SIG: &str = "56ad7185830f2e606e206c91c0d48ab1c82d089ecfde9c2812e2050e8bdb8f1e";

    #[test]
    fn known_vector_signs_and_verifies() {
        assert_eq!(payment_signature(SECRET, ORDER, PAYMENT), KNOWN_SIG);
        assert!(verify_payment_signature(SECRET, ORDER, PAYMENT, KNOWN_SIG).is_ok());
    }

    #[test]
    fn uppercase_hex_is_accepted() {
        let upper = KNOWN_SIG.to_ascii_uppercase();
        assert!(verify_payment_signature(SECRET, ORDER, PAYMENT, &upper).is_ok());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let mut tampered = KNOWN_SIG.to_string();
        tampered.replace_range(0..1, "f");
        assert!(verify_payment_signature(SECRET, ORDER, PAYMENT, &tampered).is_err());
    }

    #[test]
    fn wrong_length_signature_is_rejected() {
        assert!(verify_payment_signature(SECRET, ORDER, PAYMENT, "deadbeef").is_err());
    }

    #[test]
    fn different_payment_id_changes_signature() {
        let other = payment_signature(SECRET, ORDER, "pay_Landlot002");
        assert_ne!(other, KNOWN_SIG);
    }
}
