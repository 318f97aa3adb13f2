//! Message encryption using AES-256 in CFB mode
//!
//! All functions are pure - the nonce must be provided by the caller.
//!
//! Blob format:
//!
//! ```text
//! [ nonce (16 bytes) | ciphertext (len(plaintext) bytes) ]
//! ```
//!
//! CFB is a stream mode: there is no padding and no authentication tag.
//! Decrypting a tampered blob succeeds and yields corrupted plaintext. Use
//! [`crate::envelope`] when tampering must be detected.

use aes::Aes256;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};

use crate::{error::CryptoError, kdf::KEY_SIZE};

/// Size of the nonce prefix (16 bytes, one AES block)
pub const NONCE_SIZE: usize = 16;

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Encrypt `plaintext` under a 32-byte key, returning `nonce || ciphertext`.
///
/// # Security
///
/// - The nonce MUST be fresh for every call under the same key
/// - Caller MUST provide cryptographically secure random bytes in production
///
/// # Errors
///
/// - `InvalidKeyLength`: key is not 32 bytes
pub fn seal(plaintext: &[u8], key: &[u8], nonce: [u8; NONCE_SIZE]) -> Result<Vec<u8>, CryptoError> {
    check_key(key)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + plaintext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(plaintext);

    let cipher = Aes256CfbEnc::new_from_slices(key, &nonce).map_err(|_| invalid_key(key))?;
    cipher.encrypt(&mut blob[NONCE_SIZE..]);

    Ok(blob)
}

/// Decrypt a `nonce || ciphertext` blob.
///
/// # Errors
///
/// - `MalformedCiphertext`: blob shorter than the nonce
/// - `InvalidKeyLength`: key is not 32 bytes
pub fn open(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < NONCE_SIZE {
        return Err(CryptoError::MalformedCiphertext { len: blob.len(), min: NONCE_SIZE });
    }
    check_key(key)?;

    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
    let mut plaintext = ciphertext.to_vec();

    let cipher = Aes256CfbDec::new_from_slices(key, nonce).map_err(|_| invalid_key(key))?;
    cipher.decrypt(&mut plaintext);

    Ok(plaintext)
}

fn check_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() == KEY_SIZE { Ok(()) } else { Err(invalid_key(key)) }
}

fn invalid_key(key: &[u8]) -> CryptoError {
    CryptoError::InvalidKeyLength { expected: KEY_SIZE, got: key.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_SIZE] = [0x42; KEY_SIZE];

    #[test]
    fn seal_open_roundtrip() {
        let plaintext = b"Hello, Bob!";
        let blob = seal(plaintext, &KEY, [0xAB; NONCE_SIZE]).unwrap();
        assert_eq!(open(&blob, &KEY).unwrap(), plaintext);
    }

    #[test]
    fn seal_open_empty_message() {
        let blob = seal(b"", &KEY, [0x00; NONCE_SIZE]).unwrap();
        assert_eq!(blob.len(), NONCE_SIZE);
        assert_eq!(open(&blob, &KEY).unwrap(), b"");
    }

    #[test]
    fn seal_open_large_message() {
        let plaintext = vec![0x42u8; 64 * 1024];
        let blob = seal(&plaintext, &KEY, [0xFF; NONCE_SIZE]).unwrap();
        assert_eq!(open(&blob, &KEY).unwrap(), plaintext);
    }

    #[test]
    fn blob_is_nonce_then_same_length_ciphertext() {
        let nonce = [0x11; NONCE_SIZE];
        let plaintext = b"no padding in a stream mode";
        let blob = seal(plaintext, &KEY, nonce).unwrap();

        assert_eq!(&blob[..NONCE_SIZE], &nonce);
        assert_eq!(blob.len(), NONCE_SIZE + plaintext.len());
        assert_ne!(&blob[NONCE_SIZE..], plaintext);
    }

    #[test]
    fn different_nonces_produce_different_ciphertexts() {
        let plaintext = b"test";
        let a = seal(plaintext, &KEY, [0x00; NONCE_SIZE]).unwrap();
        let b = seal(plaintext, &KEY, [0xFF; NONCE_SIZE]).unwrap();
        assert_ne!(a[NONCE_SIZE..], b[NONCE_SIZE..]);
    }

    #[test]
    fn open_rejects_short_blob() {
        let result = open(&[0u8; NONCE_SIZE - 1], &KEY);
        assert_eq!(
            result,
            Err(CryptoError::MalformedCiphertext { len: NONCE_SIZE - 1, min: NONCE_SIZE })
        );
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        assert_eq!(
            seal(b"x", &[0u8; 16], [0u8; NONCE_SIZE]),
            Err(CryptoError::InvalidKeyLength { expected: KEY_SIZE, got: 16 })
        );
        assert_eq!(
            open(&[0u8; 20], &[0u8; 44]),
            Err(CryptoError::InvalidKeyLength { expected: KEY_SIZE, got: 44 })
        );
    }

    #[test]
    fn wrong_key_yields_garbage_not_error() {
        let blob = seal(b"secret message", &KEY, [0x01; NONCE_SIZE]).unwrap();
        let garbage = open(&blob, &[0x43; KEY_SIZE]).unwrap();
        assert_ne!(garbage, b"secret message");
    }

    #[test]
    fn tampering_goes_undetected() {
        let plaintext = b"original message";
        let mut blob = seal(plaintext, &KEY, [0x02; NONCE_SIZE]).unwrap();
        blob[NONCE_SIZE] ^= 0x01;

        let opened = open(&blob, &KEY).unwrap();
        // First byte flips exactly; CFB has no integrity check
        assert_eq!(opened[0], plaintext[0] ^ 0x01);
        assert_eq!(opened.len(), plaintext.len());
    }
}
