//! Property-based tests for the mailvault primitives
//!
//! These tests verify the fundamental invariants:
//!
//! 1. **Round-trip**: open(seal(m, k), k) == m for both blob formats
//! 2. **Nonce sensitivity**: different nonces produce different ciphertexts
//! 3. **MAC correctness**: verify(m, sign(m, k), k) and bit flips are rejected
//! 4. **Determinism**: key derivation is a pure function of its inputs
//! 5. **Fail closed**: tampered authenticated blobs never decrypt

use std::num::NonZeroU32;

use mailvault_crypto::{
    CryptoError, KEY_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE, derive_key, open, open_authenticated,
    seal, seal_authenticated, sign, verify,
};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = [u8; KEY_SIZE]> {
    any::<[u8; KEY_SIZE]>()
}

fn nonce_strategy() -> impl Strategy<Value = [u8; NONCE_SIZE]> {
    any::<[u8; NONCE_SIZE]>()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_seal_open_roundtrip(
        plaintext in prop::collection::vec(any::<u8>(), 0..1000),
        key in key_strategy(),
        nonce in nonce_strategy(),
    ) {
        let blob = seal(&plaintext, &key, nonce).unwrap();
        prop_assert_eq!(blob.len(), NONCE_SIZE + plaintext.len());
        prop_assert_eq!(open(&blob, &key).unwrap(), plaintext);
    }

    #[test]
    fn prop_authenticated_roundtrip(
        plaintext in prop::collection::vec(any::<u8>(), 0..1000),
        key in key_strategy(),
        nonce in nonce_strategy(),
    ) {
        let blob = seal_authenticated(&plaintext, &key, nonce).unwrap();
        prop_assert_eq!(blob.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
        prop_assert_eq!(open_authenticated(&blob, &key).unwrap(), plaintext);
    }

    #[test]
    fn prop_distinct_nonces_distinct_ciphertexts(
        plaintext in prop::collection::vec(any::<u8>(), 16..256),
        key in key_strategy(),
        nonce_a in nonce_strategy(),
        nonce_b in nonce_strategy(),
    ) {
        prop_assume!(nonce_a != nonce_b);

        let a = seal(&plaintext, &key, nonce_a).unwrap();
        let b = seal(&plaintext, &key, nonce_b).unwrap();

        prop_assert_ne!(&a[NONCE_SIZE..], &b[NONCE_SIZE..]);
    }

    #[test]
    fn prop_mac_verifies(
        message in prop::collection::vec(any::<u8>(), 0..512),
        key in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let signature = sign(&message, &key);
        prop_assert!(verify(&message, &signature, &key));
    }

    #[test]
    fn prop_mac_rejects_bit_flip(
        message in prop::collection::vec(any::<u8>(), 1..512),
        key in prop::collection::vec(any::<u8>(), 1..128),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let signature = sign(&message, &key);

        let mut flipped = message.clone();
        let index = position.index(flipped.len());
        flipped[index] ^= 1 << bit;

        prop_assert!(!verify(&flipped, &signature, &key));
    }

    #[test]
    fn prop_authenticated_rejects_bit_flip(
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
        key in key_strategy(),
        nonce in nonce_strategy(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut blob = seal_authenticated(&plaintext, &key, nonce).unwrap();
        let index = position.index(blob.len());
        blob[index] ^= 1 << bit;

        prop_assert_eq!(open_authenticated(&blob, &key), Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn prop_short_blobs_are_malformed(
        blob in prop::collection::vec(any::<u8>(), 0..NONCE_SIZE),
        key in key_strategy(),
    ) {
        let is_malformed = matches!(open(&blob, &key), Err(CryptoError::MalformedCiphertext { .. }));
        prop_assert!(is_malformed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    #[test]
    fn prop_derivation_deterministic(
        password in prop::collection::vec(any::<u8>(), 0..64),
        salt in any::<[u8; SALT_SIZE]>(),
        iterations in 1u32..64,
    ) {
        let iterations = NonZeroU32::new(iterations).unwrap();
        let a = derive_key(&password, &salt, iterations);
        let b = derive_key(&password, &salt, iterations);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_derivation_salt_sensitive(
        password in prop::collection::vec(any::<u8>(), 0..64),
        salt_a in any::<[u8; SALT_SIZE]>(),
        salt_b in any::<[u8; SALT_SIZE]>(),
    ) {
        prop_assume!(salt_a != salt_b);

        let iterations = NonZeroU32::new(16).unwrap();
        let a = derive_key(&password, &salt_a, iterations);
        let b = derive_key(&password, &salt_b, iterations);
        prop_assert_ne!(a, b);
    }
}
