//! Production Environment implementation using the OS RNG.

use crate::env::Environment;

/// Production environment backed by getrandom.
///
/// # Security
///
/// getrandom provides OS-level cryptographic randomness (e.g. `getrandom(2)`
/// on Linux, `BCryptGenRandom` on Windows). Suitable for salts and nonces.
///
/// # Panics
///
/// Panics if the OS RNG fails. An engine without working randomness would
/// hand out predictable salts and repeated nonces, so there is no safe way to
/// continue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot generate salts or nonces");
    }
}
