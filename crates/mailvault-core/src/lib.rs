//! Mailvault secure mailbox engine.
//!
//! Users register with a password; the engine keeps only a salt and a
//! PBKDF2-derived key. Messages are encrypted under the recipient's key and
//! queued in a per-recipient mailbox that reads back in arrival order.
//!
//! # Architecture
//!
//! ```text
//! Engine ──► CredentialStore   username → {salt, derived key}
//!   │              ▲
//!   │              │ key lookup
//!   ▼              │
//! MessageVault ────┘ ──► CipherEngine ──► mailvault_crypto
//!   │
//!   └──► recipient → [EncryptedMessage, ...]   (FIFO)
//! ```
//!
//! # Components
//!
//! - [`Engine`]: facade owning all state; cheap to clone and share
//! - [`CredentialStore`]: registration and password checks
//! - [`MessageVault`]: per-recipient encrypted mailboxes
//! - [`CipherEngine`]: seals payloads with environment-drawn nonces
//! - [`Environment`]: randomness seam; [`SystemEnv`] in production
//!
//! # Concurrency
//!
//! Every type is `Send + Sync`. The user table is read-mostly and sits behind
//! an `RwLock`; each mailbox has its own `Mutex`. Key derivation and
//! encryption never run under a lock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cipher;
mod config;
mod credentials;
mod engine;
pub mod env;
mod error;
mod system_env;
mod vault;

pub use cipher::CipherEngine;
pub use config::{EngineConfig, SealMode};
pub use credentials::CredentialStore;
pub use engine::Engine;
pub use env::Environment;
pub use error::VaultError;
pub use mailvault_crypto::{CryptoError, DIGEST_SIZE, DerivedKey};
pub use system_env::SystemEnv;
pub use vault::{EncryptedMessage, MessageVault, ReceivedMessage};
