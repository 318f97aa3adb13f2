//! Engine configuration

use std::num::NonZeroU32;

use mailvault_crypto::DEFAULT_ITERATIONS;

/// How message payloads are sealed in mailboxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SealMode {
    /// `nonce || ciphertext` under AES-256-CFB. Tampering is not detected:
    /// a modified blob decrypts to garbage.
    Plain,
    /// `nonce || ciphertext || tag` with HMAC-SHA256 over the nonce and
    /// ciphertext. Tampered blobs are rejected before decryption.
    #[default]
    EncryptThenMac,
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// PBKDF2 rounds used at registration and authentication
    pub kdf_iterations: NonZeroU32,
    /// Payload format for stored messages
    pub seal_mode: SealMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { kdf_iterations: DEFAULT_ITERATIONS, seal_mode: SealMode::default() }
    }
}

impl EngineConfig {
    /// Unauthenticated CFB payloads, byte-compatible with the plain
    /// `nonce || ciphertext` format.
    pub fn reference() -> Self {
        Self { seal_mode: SealMode::Plain, ..Self::default() }
    }

    /// Same configuration with a different PBKDF2 round count.
    #[must_use]
    pub fn with_kdf_iterations(self, kdf_iterations: NonZeroU32) -> Self {
        Self { kdf_iterations, ..self }
    }

    /// Same configuration with a different seal mode.
    #[must_use]
    pub fn with_seal_mode(self, seal_mode: SealMode) -> Self {
        Self { seal_mode, ..self }
    }
}
