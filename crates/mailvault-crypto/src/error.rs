//! Error types for the cryptographic primitives

use thiserror::Error;

/// Errors from sealing, opening and key handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Blob is too short to hold the framing it claims.
    ///
    /// Plain blobs need at least a nonce; authenticated blobs need a nonce and
    /// a tag.
    #[error("malformed ciphertext: {len} bytes, need at least {min}")]
    MalformedCiphertext {
        /// Length of the rejected blob
        len: usize,
        /// Minimum length for this format
        min: usize,
    },

    /// Key is not the size the cipher requires.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        /// Required key length
        expected: usize,
        /// Length that was supplied
        got: usize,
    },

    /// Textual key encoding could not be decoded.
    #[error("invalid key encoding: {reason}")]
    InvalidKeyEncoding {
        /// Decoder error message
        reason: String,
    },

    /// Authentication tag did not match (wrong key or tampered blob).
    #[error("authentication failed: tag mismatch")]
    AuthenticationFailed,
}
