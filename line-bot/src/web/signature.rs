//! LINE webhook signature verification.
//!
//! LINE signs every webhook delivery with HMAC-SHA256 over the raw request
//! body, keyed by the channel secret, and sends the Base64 digest in the
//! `X-Line-Signature` header.
//! Reference: https://developers.line.biz/en/reference/messaging-api/#signature-validation

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the Base64 HMAC of the body.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Compute the signature LINE would send for `body`.
///
/// Returns `Base64(HMAC-SHA256(secret, body))` using the standard padded
/// alphabet.
pub fn compute_signature(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Verify a LINE webhook signature.
///
/// # Arguments
///
/// * `secret` - The channel secret
/// * `body` - The raw request body, exactly as received
/// * `signature` - The `X-Line-Signature` header value, if present
///
/// # Returns
///
/// `true` only if the header is present, non-empty and equal to the computed
/// signature. The comparison runs in constant time.
pub fn verify_signature(secret: &[u8], body: &[u8], signature: Option<&str>) -> bool {
    let provided = match signature {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!(body_length = body.len(), "line_signature_missing");
            return false;
        }
    };

    let expected = compute_signature(secret, body);
    let valid: bool = expected.as_bytes().ct_eq(provided.as_bytes()).into();

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = provided.len(),
            "line_signature_mismatch"
        );
    }

    valid
}
