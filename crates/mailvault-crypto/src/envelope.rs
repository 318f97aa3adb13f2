//! Encrypt-then-MAC envelope over AES-256-CFB and HMAC-SHA256
//!
//! Blob format:
//!
//! ```text
//! [ nonce (16 bytes) | ciphertext | tag (32 bytes) ]
//! tag = HMAC-SHA256(mac_key, nonce || ciphertext)
//! ```
//!
//! The caller's 32-byte key is never used directly. HKDF splits it into an
//! encryption subkey and a MAC subkey. The tag is checked before any
//! decryption happens, so a tampered blob is rejected rather than decrypted
//! into garbage.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{
    cipher::{self, NONCE_SIZE},
    error::CryptoError,
    integrity::{self, DIGEST_SIZE},
    kdf::KEY_SIZE,
};

/// Size of the trailing authentication tag (32 bytes)
pub const TAG_SIZE: usize = DIGEST_SIZE;

/// HKDF info label for the encryption subkey
const ENC_LABEL: &[u8] = b"mailvaultEncV1";

/// HKDF info label for the MAC subkey
const MAC_LABEL: &[u8] = b"mailvaultMacV1";

/// Encryption and MAC subkeys. Zeroized on drop.
struct SubKeys {
    enc: [u8; KEY_SIZE],
    mac: [u8; KEY_SIZE],
}

impl SubKeys {
    fn split(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength { expected: KEY_SIZE, got: key.len() });
        }

        let hkdf = Hkdf::<Sha256>::new(None, key);
        let mut keys = Self { enc: [0u8; KEY_SIZE], mac: [0u8; KEY_SIZE] };

        let Ok(()) = hkdf.expand(ENC_LABEL, &mut keys.enc) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };
        let Ok(()) = hkdf.expand(MAC_LABEL, &mut keys.mac) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };

        Ok(keys)
    }
}

impl Drop for SubKeys {
    fn drop(&mut self) {
        self.enc.zeroize();
        self.mac.zeroize();
    }
}

/// Seal `plaintext` as `nonce || ciphertext || tag`.
///
/// # Errors
///
/// - `InvalidKeyLength`: key is not 32 bytes
pub fn seal_authenticated(
    plaintext: &[u8],
    key: &[u8],
    nonce: [u8; NONCE_SIZE],
) -> Result<Vec<u8>, CryptoError> {
    let keys = SubKeys::split(key)?;

    let mut blob = cipher::seal(plaintext, &keys.enc, nonce)?;
    let tag = integrity::sign(&blob, &keys.mac);
    blob.extend_from_slice(&tag);

    Ok(blob)
}

/// Verify and decrypt a `nonce || ciphertext || tag` blob.
///
/// # Errors
///
/// - `MalformedCiphertext`: blob shorter than nonce plus tag
/// - `InvalidKeyLength`: key is not 32 bytes
/// - `AuthenticationFailed`: tag mismatch (wrong key or tampered blob)
pub fn open_authenticated(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let min = NONCE_SIZE + TAG_SIZE;
    if blob.len() < min {
        return Err(CryptoError::MalformedCiphertext { len: blob.len(), min });
    }

    let keys = SubKeys::split(key)?;
    let (sealed, tag) = blob.split_at(blob.len() - TAG_SIZE);

    if !integrity::verify(sealed, tag, &keys.mac) {
        return Err(CryptoError::AuthenticationFailed);
    }

    cipher::open(sealed, &keys.enc)
}
