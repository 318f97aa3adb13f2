//! Mailvault Cryptographic Primitives
//!
//! Building blocks for the mailvault engine. Pure functions: callers provide
//! salts and nonces, so every output is reproducible in tests.
//!
//! # Key Lifecycle
//!
//! A user's password is stretched into a 32-byte key once, at registration.
//! Every message addressed to that user is sealed under that key with a fresh
//! nonce.
//!
//! ```text
//! password + salt (16 bytes)
//!        │
//!        ▼
//! PBKDF2-HMAC-SHA256 (100k rounds) → Derived Key (32 bytes)
//!        │
//!        ├──────────────► AES-256-CFB → nonce || ciphertext
//!        │
//!        ▼
//! HKDF → (encryption subkey, MAC subkey)
//!        │
//!        ▼
//! AES-256-CFB + HMAC-SHA256 → nonce || ciphertext || tag
//! ```
//!
//! # Security
//!
//! Confidentiality:
//! - Each seal draws a fresh 16-byte nonce; reusing a nonce under one key
//!   leaks the XOR of the plaintexts
//! - Derived keys are zeroized on drop
//!
//! Integrity:
//! - Plain CFB ([`cipher`]) has none. Flipped ciphertext bits flip the
//!   matching plaintext bits and garble the following block
//! - The [`envelope`] format verifies an HMAC tag before decrypting and fails
//!   closed
//! - [`integrity`] exposes HMAC-SHA256 as a standalone primitive
//!
//! Timing:
//! - Key and tag comparisons go through `subtle`

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod envelope;
mod error;
pub mod integrity;
pub mod kdf;

pub use cipher::{NONCE_SIZE, open, seal};
pub use envelope::{TAG_SIZE, open_authenticated, seal_authenticated};
pub use error::CryptoError;
pub use integrity::{DIGEST_SIZE, sign, verify};
pub use kdf::{DEFAULT_ITERATIONS, DerivedKey, KEY_SIZE, SALT_SIZE, Salt, derive_key};
