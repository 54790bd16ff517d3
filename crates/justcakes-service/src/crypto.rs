//! Cryptographic utilities for webhook verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 over a sequence of byte chunks and return the hex digest.
///
/// Chunks are fed in order, so `["123.", body]` signs `123.` followed by the raw body
/// without copying it.
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &[u8], chunks: &[&[u8]]) -> String {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104, so
    // `new_from_slice` only fails if the Hmac implementation is broken.
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts any key size");
    for chunk in chunks {
        mac.update(chunk);
    }
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison to prevent timing attacks.
///
/// Length is not secret; only the contents are compared in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha256_rfc4231_case_2() {
        let result = hmac_sha256_hex(b"Jefe", &[b"what do ya want ".as_slice(), b"for nothing?".as_slice()]);
        assert_eq!(
            result,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_sha256_different_inputs() {
        let a = hmac_sha256_hex(b"secret", &[b"message1".as_slice()]);
        let b = hmac_sha256_hex(b"secret", &[b"message2".as_slice()]);
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(!constant_time_eq(b"abc", b"ABC"));
    }
}
