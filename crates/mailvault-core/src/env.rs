//! Environment abstraction for deterministic testing.
//!
//! Decouples the engine from the system RNG. Production uses
//! [`SystemEnv`](crate::SystemEnv); tests plug in seeded or fixed sources so
//! salts and nonces are reproducible.

use mailvault_crypto::{NONCE_SIZE, SALT_SIZE, Salt};

/// Abstract source of randomness for salts and nonces.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Two calls never return correlated output in production. Nonces are
///   drawn from here, and a repeated nonce under one key breaks CFB
///   confidentiality
/// - The method is infallible except in exceptional circumstances (e.g. OS
///   entropy failure, incorrect test setup)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a fresh per-user salt.
    fn random_salt(&self) -> Salt {
        let mut salt = [0u8; SALT_SIZE];
        self.random_bytes(&mut salt);
        salt
    }

    /// Generates a fresh cipher nonce.
    fn random_nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        self.random_bytes(&mut nonce);
        nonce
    }
}
