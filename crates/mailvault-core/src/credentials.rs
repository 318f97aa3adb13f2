//! Credential store: password-derived keys per user.
//!
//! Registration draws a random salt and stretches the password with PBKDF2.
//! Only `{salt, derived_key}` is kept; the password is never stored.
//!
//! The user table is read-mostly, so it sits behind an `RwLock`: concurrent
//! `authenticate` calls take shared locks and run in parallel. Key derivation
//! always happens with no lock held.

#![allow(clippy::expect_used, reason = "Lock poisoning should cause a panic")]

use std::{
    collections::{HashMap, hash_map::Entry},
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use mailvault_crypto::{DerivedKey, Salt, derive_key};
use tracing::{debug, warn};

use crate::{env::Environment, error::VaultError};

/// A registered user.
#[derive(Clone)]
struct UserRecord {
    salt: Salt,
    key: DerivedKey,
}

/// Thread-safe user table.
///
/// Clone shares the same underlying table. Derived keys never leave the
/// crate:
///
/// ```compile_fail
/// let engine = mailvault_core::Engine::new();
/// let _key = engine.credentials().key("alice");
/// ```
#[derive(Clone)]
pub struct CredentialStore<E: Environment> {
    env: E,
    kdf_iterations: NonZeroU32,
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl<E: Environment> CredentialStore<E> {
    /// Create an empty store.
    pub fn new(env: E, kdf_iterations: NonZeroU32) -> Self {
        Self { env, kdf_iterations, users: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// PBKDF2 rounds this store derives with.
    pub fn kdf_iterations(&self) -> NonZeroU32 {
        self.kdf_iterations
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `UserExists`: the username is taken. The stored record is not
    ///   modified.
    pub fn register(&self, username: &str, password: &str) -> Result<(), VaultError> {
        // Cheap early rejection before paying for key derivation
        if self.contains(username) {
            warn!(username, "rejected duplicate registration");
            return Err(VaultError::UserExists { username: username.to_owned() });
        }

        let salt = self.env.random_salt();
        let key = derive_key(password.as_bytes(), &salt, self.kdf_iterations);

        let mut users = self.users.write().expect("user table lock poisoned");
        match users.entry(username.to_owned()) {
            Entry::Occupied(_) => {
                warn!(username, "rejected duplicate registration");
                Err(VaultError::UserExists { username: username.to_owned() })
            },
            Entry::Vacant(slot) => {
                slot.insert(UserRecord { salt, key });
                debug!(username, "user registered");
                Ok(())
            },
        }
    }

    /// Check a password against the stored key.
    ///
    /// Returns `false` for unknown users and wrong passwords alike. The key
    /// comparison is constant-time.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let Some(record) = self.record(username) else {
            debug!(username, "authentication for unknown user");
            return false;
        };

        let candidate = derive_key(password.as_bytes(), &record.salt, self.kdf_iterations);
        // DerivedKey equality is constant-time
        let matched = candidate == record.key;

        debug!(username, matched, "authentication attempt");
        matched
    }

    /// Derived key for `username`. Crate-internal: the vault resolves
    /// recipient keys through this, and nothing outside the crate can read
    /// key material.
    ///
    /// # Errors
    ///
    /// - `UnknownUser`: the username is not registered
    pub(crate) fn key(&self, username: &str) -> Result<DerivedKey, VaultError> {
        self.record(username)
            .map(|record| record.key)
            .ok_or_else(|| VaultError::unknown_user(username))
    }

    /// Whether `username` is registered.
    pub fn contains(&self, username: &str) -> bool {
        self.users.read().expect("user table lock poisoned").contains_key(username)
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.read().expect("user table lock poisoned").len()
    }

    /// Whether no user is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a record, taken under a short read lock.
    fn record(&self, username: &str) -> Option<UserRecord> {
        self.users.read().expect("user table lock poisoned").get(username).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemEnv;

    fn store() -> CredentialStore<SystemEnv> {
        CredentialStore::new(SystemEnv::new(), NonZeroU32::new(1_000).unwrap())
    }

    #[derive(Clone)]
    struct FixedEnv(u8);

    impl Environment for FixedEnv {
        fn random_bytes(&self, buffer: &mut [u8]) {
            buffer.fill(self.0);
        }
    }

    #[test]
    fn new_store_is_empty() {
        let store = store();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn register_then_authenticate() {
        let store = store();
        store.register("alice", "password123").unwrap();

        assert!(store.authenticate("alice", "password123"));
        assert!(!store.authenticate("alice", "wrongpass"));
    }

    #[test]
    fn unknown_user_does_not_authenticate() {
        let store = store();
        assert!(!store.authenticate("nobody", "password123"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let store = store();
        store.register("alice", "password123").unwrap();
        let original = store.key("alice").unwrap();

        let result = store.register("alice", "another password");
        assert_eq!(result, Err(VaultError::UserExists { username: "alice".to_owned() }));

        // Record untouched
        assert_eq!(store.key("alice").unwrap(), original);
        assert!(store.authenticate("alice", "password123"));
        assert!(!store.authenticate("alice", "another password"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn key_for_unknown_user_fails() {
        let store = store();
        assert_eq!(
            store.key("nobody"),
            Err(VaultError::UnknownUser { username: "nobody".to_owned() })
        );
    }

    #[test]
    fn key_matches_derivation_with_stored_salt() {
        let store = CredentialStore::new(FixedEnv(0x11), NonZeroU32::new(500).unwrap());
        store.register("alice", "password123").unwrap();

        let expected =
            derive_key(b"password123", &[0x11; mailvault_crypto::SALT_SIZE], store.kdf_iterations());
        assert_eq!(store.key("alice").unwrap(), expected);
    }

    #[test]
    fn same_password_different_users_different_keys() {
        let store = store();
        store.register("alice", "shared").unwrap();
        store.register("bob", "shared").unwrap();

        assert_ne!(store.key("alice").unwrap(), store.key("bob").unwrap());
    }

    #[test]
    fn clones_share_the_table() {
        let store = store();
        let clone = store.clone();
        store.register("alice", "password123").unwrap();

        assert!(clone.contains("alice"));
        assert!(clone.authenticate("alice", "password123"));
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let store = store();
        store.register("alice", "password123").unwrap();
        assert!(!store.contains("Alice"));
        assert!(!store.authenticate("Alice", "password123"));
    }
}
