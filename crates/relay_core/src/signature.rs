//! HMAC-SHA256 webhook signatures.
//!
//! GitHub signs each delivery with the shared secret and sends the result as
//! `X-Hub-Signature-256: sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of the signature header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Computes the signature header value for `payload`.
///
/// Returns a string in the format `sha256=<hex-encoded-signature>`, or
/// `None` if the secret is rejected as an HMAC key.
pub fn compute_signature(secret: &str, payload: &[u8]) -> Option<String> {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return None;
    };
    mac.update(payload);
    Some(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Returns `true` when `signature_header` matches the HMAC-SHA256 of
/// `payload` under `secret`.
///
/// Uses a constant-time comparison.
pub fn verify_signature(secret: &str, payload: &[u8], signature_header: &str) -> bool {
    let Some(hex_part) = signature_header.trim().strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };

    let Ok(expected) = hex::decode(hex_part) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Compares a bearer token against the expected secret without
/// short-circuiting on the first differing byte.
pub fn verify_bearer(secret: &str, authorization_header: &str) -> bool {
    let Some(token) = authorization_header.trim().strip_prefix("Bearer ") else {
        return false;
    };

    let (Ok(mut expected), Ok(mut presented)) = (
        HmacSha256::new_from_slice(b"bearer"),
        HmacSha256::new_from_slice(b"bearer"),
    ) else {
        return false;
    };
    expected.update(secret.as_bytes());
    presented.update(token.trim().as_bytes());

    presented
        .verify_slice(&expected.finalize().into_bytes())
        .is_ok()
}
