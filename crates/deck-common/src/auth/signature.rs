//! Payment callback signature verification
//!
//! The gateway signs `order_id|payment_id` with the shared key secret using
//! HMAC-SHA256 and sends the lowercase hex digest back with the callback.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

fn signing_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

fn compute(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(signing_payload(order_id, payment_id).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check a payment signature in constant time. Any mismatch is `false`.
#[must_use]
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let Some(expected) = compute(secret, order_id, payment_id) else {
        return false;
    };

    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Verifier bound to the gateway key secret
#[derive(Clone)]
pub struct PaymentSignatureVerifier {
    secret: String,
}

impl PaymentSignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signature the gateway would produce for this order and payment
    pub fn sign(&self, order_id: &str, payment_id: &str) -> Option<String> {
        compute(&self.secret, order_id, payment_id)
    }

    #[must_use]
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_payment_signature(order_id, payment_id, signature, &self.secret)
    }
}

impl std::fmt::Debug for PaymentSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSignatureVerifier").finish_non_exhaustive()
    }
}
