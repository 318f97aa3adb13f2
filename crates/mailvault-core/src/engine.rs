//! Engine facade.
//!
//! One owned [`Engine`] bundles the credential store, the cipher and the
//! mailboxes behind a single API. Clones are cheap handles to the same
//! state and can be moved into worker threads or tasks.
//!
//! # Offloaded operations
//!
//! Registration, authentication and every mailbox operation run PBKDF2 or
//! AES directly on the caller's thread. From async code, use the
//! `*_offloaded` variants: they move the work onto tokio's blocking pool so
//! 100k-round key derivation never stalls the executor. Passwords cross
//! into the worker inside [`Zeroizing`] and are wiped when the task ends.

use mailvault_crypto::{DIGEST_SIZE, integrity};
use tokio::task;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{
    cipher::CipherEngine,
    config::EngineConfig,
    credentials::CredentialStore,
    env::Environment,
    error::VaultError,
    system_env::SystemEnv,
    vault::{MessageVault, ReceivedMessage},
};

/// Secure mailbox engine.
#[derive(Clone)]
pub struct Engine<E: Environment = SystemEnv> {
    config: EngineConfig,
    credentials: CredentialStore<E>,
    vault: MessageVault<E>,
}

impl Engine<SystemEnv> {
    /// Engine with OS randomness and the default configuration.
    ///
    /// The default seal mode is [`SealMode::EncryptThenMac`]: stored payloads
    /// are `nonce || ciphertext || tag`, encrypted under an HKDF subkey of
    /// the recipient's key rather than the key itself. Use
    /// [`EngineConfig::reference()`] for the plain `nonce || ciphertext`
    /// format under the recipient's derived key.
    ///
    /// [`SealMode::EncryptThenMac`]: crate::SealMode::EncryptThenMac
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine with OS randomness and the given configuration.
    ///
    /// `config.seal_mode` fixes the stored payload format for the engine's
    /// lifetime; see [`new`](Self::new).
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_env(SystemEnv::new(), config)
    }
}

impl Default for Engine<SystemEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Environment> Engine<E> {
    /// Engine drawing salts and nonces from `env`.
    pub fn with_env(env: E, config: EngineConfig) -> Self {
        let credentials = CredentialStore::new(env.clone(), config.kdf_iterations);
        let vault = MessageVault::new(credentials.clone(), CipherEngine::new(env), config.seal_mode);

        info!(
            kdf_iterations = config.kdf_iterations.get(),
            seal_mode = ?config.seal_mode,
            "mailbox engine initialised"
        );

        Self { config, credentials, vault }
    }

    /// Active configuration.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Underlying credential store.
    pub fn credentials(&self) -> &CredentialStore<E> {
        &self.credentials
    }

    /// Underlying mailboxes.
    pub fn vault(&self) -> &MessageVault<E> {
        &self.vault
    }

    /// Register `username` with `password`.
    ///
    /// # Errors
    ///
    /// - `UserExists`: the username is taken
    pub fn register(&self, username: &str, password: &str) -> Result<(), VaultError> {
        self.credentials.register(username, password)
    }

    /// Check `password` for `username`. Unknown users yield `false`.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.credentials.authenticate(username, password)
    }

    /// Seal `message` for `recipient` and append it to their mailbox.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: sender or recipient is not registered
    pub fn send(&self, sender: &str, recipient: &str, message: &[u8]) -> Result<(), VaultError> {
        self.vault.send(sender, recipient, message)
    }

    /// Every message in `recipient`'s mailbox, decrypted, oldest first.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    /// - `Crypto`: a stored payload failed to open
    pub fn receive(&self, recipient: &str) -> Result<Vec<ReceivedMessage>, VaultError> {
        self.vault.receive(recipient)
    }

    /// Decrypt and remove every message in `recipient`'s mailbox.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    /// - `Crypto`: a stored payload failed to open; the mailbox is unchanged
    pub fn drain(&self, recipient: &str) -> Result<Vec<ReceivedMessage>, VaultError> {
        self.vault.drain(recipient)
    }

    /// HMAC-SHA256 of `message` under `key`.
    pub fn sign(&self, message: &[u8], key: &[u8]) -> [u8; DIGEST_SIZE] {
        integrity::sign(message, key)
    }

    /// Constant-time check of `signature` against `message` under `key`.
    pub fn verify(&self, message: &[u8], signature: &[u8], key: &[u8]) -> bool {
        integrity::verify(message, signature, key)
    }

    /// [`register`](Self::register) on the blocking pool.
    ///
    /// # Errors
    ///
    /// - `UserExists`: the username is taken
    /// - `Worker`: the blocking task panicked or was cancelled
    pub async fn register_offloaded(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), VaultError> {
        let engine = self.clone();
        let username = username.into();
        let password = Zeroizing::new(password.into());

        task::spawn_blocking(move || engine.register(&username, &password)).await?
    }

    /// [`authenticate`](Self::authenticate) on the blocking pool.
    ///
    /// # Errors
    ///
    /// - `Worker`: the blocking task panicked or was cancelled
    pub async fn authenticate_offloaded(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<bool, VaultError> {
        let engine = self.clone();
        let username = username.into();
        let password = Zeroizing::new(password.into());

        let matched = task::spawn_blocking(move || engine.authenticate(&username, &password)).await?;
        Ok(matched)
    }

    /// [`send`](Self::send) on the blocking pool.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: sender or recipient is not registered
    /// - `Worker`: the blocking task panicked or was cancelled
    pub async fn send_offloaded(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        message: impl Into<Vec<u8>>,
    ) -> Result<(), VaultError> {
        let engine = self.clone();
        let sender = sender.into();
        let recipient = recipient.into();
        let message = message.into();

        task::spawn_blocking(move || engine.send(&sender, &recipient, &message)).await?
    }

    /// [`receive`](Self::receive) on the blocking pool.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    /// - `Crypto`: a stored payload failed to open
    /// - `Worker`: the blocking task panicked or was cancelled
    pub async fn receive_offloaded(
        &self,
        recipient: impl Into<String>,
    ) -> Result<Vec<ReceivedMessage>, VaultError> {
        let engine = self.clone();
        let recipient = recipient.into();

        let messages = task::spawn_blocking(move || engine.receive(&recipient)).await??;
        debug!(count = messages.len(), "offloaded receive complete");
        Ok(messages)
    }
}
