//! Password key derivation using PBKDF2-HMAC-SHA256

use std::{fmt, num::NonZeroU32};

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Derived key size (32 bytes, an AES-256 key)
pub const KEY_SIZE: usize = 32;

/// Per-user salt size (16 bytes)
pub const SALT_SIZE: usize = 16;

/// Default PBKDF2 round count.
// 1 + 99_999, spelled this way to stay unwrap-free in const context
pub const DEFAULT_ITERATIONS: NonZeroU32 = NonZeroU32::MIN.saturating_add(99_999);

/// Random per-user salt mixed into key derivation.
pub type Salt = [u8; SALT_SIZE];

/// A 32-byte key derived from a password.
///
/// Zeroized on drop. Equality is constant-time, and `Debug` never prints the
/// key bytes.
#[derive(Clone)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// URL-safe base64 encoding, for callers that keep the key in a string
    /// field.
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(&self.0)
    }

    /// Parse a key produced by [`to_base64`](Self::to_base64).
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let mut decoded = URL_SAFE
            .decode(encoded)
            .map_err(|err| CryptoError::InvalidKeyEncoding { reason: err.to_string() })?;

        if decoded.len() != KEY_SIZE {
            let got = decoded.len();
            decoded.zeroize();
            return Err(CryptoError::InvalidKeyLength { expected: KEY_SIZE, got });
        }

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(key))
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl ConstantTimeEq for DerivedKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// Deterministic: the same `(password, salt, iterations)` always yields the
/// same key. Registration always uses a random [`Salt`]; any salt length is
/// accepted here. CPU cost grows linearly with `iterations`; callers on an
/// async executor should run this on a blocking pool.
pub fn derive_key(password: &[u8], salt: &[u8], iterations: NonZeroU32) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations.get(), &mut key);
    DerivedKey(key)
}
