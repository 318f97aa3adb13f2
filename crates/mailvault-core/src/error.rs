//! Engine error types.
//!
//! Every failure is local to the operation that produced it: an error never
//! leaves the user table or another mailbox in a modified state.
//!
//! A wrong password is not an error. `authenticate` returns `false`.

use mailvault_crypto::CryptoError;
use thiserror::Error;

/// Errors returned by the credential store, the vault and the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Username is not registered.
    ///
    /// Returned by `send` (for either party), `receive`, `drain` and key
    /// lookup.
    #[error("unknown user: {username}")]
    UnknownUser {
        /// Username that was not found
        username: String,
    },

    /// Username is already registered.
    ///
    /// The existing record is left untouched. Overwriting it would orphan
    /// every message already sealed under the old key.
    #[error("user already exists: {username}")]
    UserExists {
        /// Username that is taken
        username: String,
    },

    /// Cipher or digest primitive rejected its input.
    ///
    /// Covers malformed blobs, invalid key lengths and failed tag checks.
    #[error("crypto failure: {0}")]
    Crypto(#[from] CryptoError),

    /// Blocking worker task failed (panicked or was cancelled).
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl VaultError {
    pub(crate) fn unknown_user(username: &str) -> Self {
        Self::UnknownUser { username: username.to_owned() }
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
