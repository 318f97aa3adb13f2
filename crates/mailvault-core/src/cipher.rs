//! Nonce-managing wrapper over the pure cipher functions.

use mailvault_crypto::{CryptoError, cipher as cfb, envelope};

use crate::{config::SealMode, env::Environment};

/// Seals and opens payloads, drawing a fresh nonce from the environment for
/// every seal.
///
/// Nonces are never derived from counters, so independent engines (or a
/// restarted one) cannot collide on a nonce under the same key.
#[derive(Clone, Debug)]
pub struct CipherEngine<E: Environment> {
    env: E,
}

impl<E: Environment> CipherEngine<E> {
    /// Create a cipher engine using `env` for nonces.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// AES-256-CFB seal: returns `nonce || ciphertext`.
    pub fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        cfb::seal(plaintext, key, self.env.random_nonce())
    }

    /// Open a `nonce || ciphertext` blob. Tampering is not detected.
    pub fn open(&self, blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        cfb::open(blob, key)
    }

    /// Encrypt-then-MAC seal: returns `nonce || ciphertext || tag`.
    pub fn seal_authenticated(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        envelope::seal_authenticated(plaintext, key, self.env.random_nonce())
    }

    /// Verify and open a `nonce || ciphertext || tag` blob.
    pub fn open_authenticated(&self, blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        envelope::open_authenticated(blob, key)
    }

    /// Seal in the given mode.
    pub fn seal_with(
        &self,
        mode: SealMode,
        plaintext: &[u8],
        key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        match mode {
            SealMode::Plain => self.seal(plaintext, key),
            SealMode::EncryptThenMac => self.seal_authenticated(plaintext, key),
        }
    }

    /// Open in the given mode.
    pub fn open_with(&self, mode: SealMode, blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match mode {
            SealMode::Plain => self.open(blob, key),
            SealMode::EncryptThenMac => self.open_authenticated(blob, key),
        }
    }
}
