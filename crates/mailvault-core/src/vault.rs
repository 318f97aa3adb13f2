//! Per-recipient encrypted mailboxes.
//!
//! Messages are sealed under the **recipient's** derived key and appended to
//! the recipient's mailbox. Reading decrypts with the reader's own key; the
//! sender's key is never involved.
//!
//! # Locking
//!
//! Each mailbox has its own `Mutex`, so sends to unrelated recipients never
//! contend. The directory of mailboxes is an `RwLock` held only long enough
//! to look up (or create) a mailbox handle. No code path holds two mailbox
//! locks, so there is no lock ordering to get wrong.
//!
//! Sealing happens before the mailbox lock is taken; only the append runs
//! under it. `receive` copies the mailbox under the lock and decrypts after
//! releasing it, so a concurrent `send` can never produce a torn read.

#![allow(clippy::expect_used, reason = "Lock poisoning should cause a panic")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use mailvault_crypto::DerivedKey;
use tracing::{debug, warn};

use crate::{
    cipher::CipherEngine, config::SealMode, credentials::CredentialStore, env::Environment,
    error::VaultError,
};

/// A sealed message as stored in a mailbox. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// Username of the sender
    pub sender: String,
    /// Sealed payload (`nonce || ciphertext`, plus a tag in authenticated
    /// mode)
    pub payload: Vec<u8>,
}

/// A decrypted message handed back to the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Username of the sender
    pub sender: String,
    /// Decrypted message bytes
    pub message: Vec<u8>,
}

impl From<ReceivedMessage> for (String, Vec<u8>) {
    fn from(received: ReceivedMessage) -> Self {
        (received.sender, received.message)
    }
}

type Mailbox = Arc<Mutex<Vec<EncryptedMessage>>>;

/// Owner of every mailbox.
///
/// Clone shares the same mailboxes and the same credential store.
#[derive(Clone)]
pub struct MessageVault<E: Environment> {
    credentials: CredentialStore<E>,
    cipher: CipherEngine<E>,
    seal_mode: SealMode,
    mailboxes: Arc<RwLock<HashMap<String, Mailbox>>>,
}

impl<E: Environment> MessageVault<E> {
    /// Create an empty vault resolving keys through `credentials`.
    pub fn new(credentials: CredentialStore<E>, cipher: CipherEngine<E>, seal_mode: SealMode) -> Self {
        Self { credentials, cipher, seal_mode, mailboxes: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Payload format used for new and stored messages.
    pub fn seal_mode(&self) -> SealMode {
        self.seal_mode
    }

    /// Seal `plaintext` for `recipient` and append it to their mailbox.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: sender or recipient is not registered
    /// - `Crypto`: sealing failed
    pub fn send(&self, sender: &str, recipient: &str, plaintext: &[u8]) -> Result<(), VaultError> {
        if !self.credentials.contains(sender) {
            return Err(VaultError::unknown_user(sender));
        }
        let key = self.credentials.key(recipient)?;

        let payload = self.cipher.seal_with(self.seal_mode, plaintext, key.as_bytes())?;
        let message = EncryptedMessage { sender: sender.to_owned(), payload };

        let mailbox = self.mailbox_or_create(recipient);
        let depth = {
            let mut entries = mailbox.lock().expect("mailbox lock poisoned");
            entries.push(message);
            entries.len()
        };

        debug!(sender, recipient, depth, "message delivered");
        Ok(())
    }

    /// Decrypt every message in `recipient`'s mailbox, oldest first.
    ///
    /// Non-destructive: the mailbox is an append-only log and repeated calls
    /// replay it in full. Use [`drain`](Self::drain) for at-most-once
    /// delivery.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    /// - `Crypto`: a stored payload failed to open (authenticated mode only
    ///   detects tampering)
    pub fn receive(&self, recipient: &str) -> Result<Vec<ReceivedMessage>, VaultError> {
        let key = self.credentials.key(recipient)?;

        let snapshot = match self.mailbox(recipient) {
            Some(mailbox) => mailbox.lock().expect("mailbox lock poisoned").clone(),
            None => Vec::new(),
        };

        let messages = self.open_all(recipient, &snapshot, &key)?;
        debug!(recipient, count = messages.len(), "mailbox read");
        Ok(messages)
    }

    /// Decrypt and remove every message in `recipient`'s mailbox.
    ///
    /// All-or-nothing: if any payload fails to open, the mailbox is left
    /// intact and the error is returned. Holds the mailbox lock while
    /// decrypting so no concurrent `send` slips between the read and the
    /// clear.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    /// - `Crypto`: a stored payload failed to open
    pub fn drain(&self, recipient: &str) -> Result<Vec<ReceivedMessage>, VaultError> {
        let key = self.credentials.key(recipient)?;

        let Some(mailbox) = self.mailbox(recipient) else {
            return Ok(Vec::new());
        };

        let mut entries = mailbox.lock().expect("mailbox lock poisoned");
        let messages = self.open_all(recipient, &entries, &key)?;
        entries.clear();
        drop(entries);

        debug!(recipient, count = messages.len(), "mailbox drained");
        Ok(messages)
    }

    /// Number of messages waiting for `recipient`.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    pub fn mailbox_len(&self, recipient: &str) -> Result<usize, VaultError> {
        if !self.credentials.contains(recipient) {
            return Err(VaultError::unknown_user(recipient));
        }

        Ok(self
            .mailbox(recipient)
            .map_or(0, |mailbox| mailbox.lock().expect("mailbox lock poisoned").len()))
    }

    /// Raw sealed entries for `recipient`, oldest first.
    ///
    /// Exposes the stored form for inspection (e.g. checking that payloads
    /// never contain plaintext).
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: recipient is not registered
    pub fn sealed_entries(&self, recipient: &str) -> Result<Vec<EncryptedMessage>, VaultError> {
        if !self.credentials.contains(recipient) {
            return Err(VaultError::unknown_user(recipient));
        }

        Ok(self
            .mailbox(recipient)
            .map(|mailbox| mailbox.lock().expect("mailbox lock poisoned").clone())
            .unwrap_or_default())
    }

    fn open_all(
        &self,
        recipient: &str,
        entries: &[EncryptedMessage],
        key: &DerivedKey,
    ) -> Result<Vec<ReceivedMessage>, VaultError> {
        entries
            .iter()
            .enumerate()
            .map(|(position, entry)| -> Result<ReceivedMessage, VaultError> {
                let message = self
                    .cipher
                    .open_with(self.seal_mode, &entry.payload, key.as_bytes())
                    .inspect_err(|err| {
                        warn!(recipient, position, sender = %entry.sender, %err, "stored message failed to open");
                    })?;
                Ok(ReceivedMessage { sender: entry.sender.clone(), message })
            })
            .collect()
    }

    fn mailbox(&self, recipient: &str) -> Option<Mailbox> {
        self.mailboxes.read().expect("mailbox directory lock poisoned").get(recipient).cloned()
    }

    fn mailbox_or_create(&self, recipient: &str) -> Mailbox {
        if let Some(mailbox) = self.mailbox(recipient) {
            return mailbox;
        }

        self.mailboxes
            .write()
            .expect("mailbox directory lock poisoned")
            .entry(recipient.to_owned())
            .or_default()
            .clone()
    }
}
