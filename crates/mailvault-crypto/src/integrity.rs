//! Keyed message digests using HMAC-SHA256
//!
//! Standalone tamper detection for arbitrary byte payloads. Not applied to
//! stored messages automatically; see [`crate::envelope`] for the combined
//! format.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 digest size (32 bytes)
pub const DIGEST_SIZE: usize = 32;

/// Compute HMAC-SHA256 over `message` keyed by `key`.
///
/// Keys of any length are accepted (HMAC hashes long keys and pads short ones).
pub fn sign(message: &[u8], key: &[u8]) -> [u8; DIGEST_SIZE] {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Check `signature` against a fresh digest of `message`.
///
/// Constant-time in the digest contents. Returns `false` on any mismatch,
/// including a signature of the wrong length.
pub fn verify(message: &[u8], signature: &[u8], key: &[u8]) -> bool {
    let expected = sign(message, key);
    if signature.len() != DIGEST_SIZE {
        return false;
    }
    expected[..].ct_eq(signature).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        assert_eq!(sign(b"message", b"key"), sign(b"message", b"key"));
    }

    #[test]
    fn verify_accepts_own_signature() {
        let signature = sign(b"payload", b"shared key");
        assert!(verify(b"payload", &signature, b"shared key"));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let signature = sign(b"payload", b"shared key");
        assert!(!verify(b"payload", &signature, b"other key"));
    }

    #[test]
    fn verify_rejects_modified_message() {
        let signature = sign(b"payload", b"k");
        assert!(!verify(b"paylaod", &signature, b"k"));
    }

    #[test]
    fn verify_rejects_truncated_signature() {
        let signature = sign(b"payload", b"k");
        assert!(!verify(b"payload", &signature[..DIGEST_SIZE - 1], b"k"));
        assert!(!verify(b"payload", &[], b"k"));
    }

    #[test]
    fn verify_rejects_extended_signature() {
        let mut signature = sign(b"payload", b"k").to_vec();
        signature.push(0);
        assert!(!verify(b"payload", &signature, b"k"));
    }

    #[test]
    fn empty_key_and_message_are_accepted() {
        let signature = sign(b"", b"");
        assert!(verify(b"", &signature, b""));
    }

    #[test]
    fn long_key_is_accepted() {
        let key = vec![0xAA; 131];
        let signature = sign(b"message", &key);
        assert!(verify(b"message", &signature, &key));
    }
}
