//! Fuzz target for sealed payload parsing
//!
//! Feeds arbitrary blobs and keys to both payload formats.
//!
//! # Strategy
//!
//! - Arbitrary blobs, including ones shorter than the nonce or tag
//! - Keys of valid and invalid length
//! - Valid sealed payloads with one byte flipped
//!
//! # Invariants
//!
//! - Opening never panics on any input
//! - Blobs below the minimum length are rejected as malformed
//! - Valid payloads roundtrip in both formats
//! - A flipped byte in an authenticated payload is always rejected

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mailvault_crypto::{
    open, open_authenticated, seal, seal_authenticated, CryptoError, KEY_SIZE, NONCE_SIZE,
    TAG_SIZE,
};

#[derive(Debug, Arbitrary)]
struct EnvelopeScenario {
    /// Raw blob handed straight to the openers
    blob: Vec<u8>,
    /// Key of arbitrary length
    loose_key: Vec<u8>,
    /// Well-formed key for roundtrips
    key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    plaintext: Vec<u8>,
    /// Byte position to corrupt (wrapped into range)
    flip_at: u16,
}

fuzz_target!(|scenario: EnvelopeScenario| {
    // INVARIANT 1: Arbitrary input never panics
    let plain = open(&scenario.blob, &scenario.loose_key);
    let authenticated = open_authenticated(&scenario.blob, &scenario.loose_key);

    // INVARIANT 2: Short blobs are malformed regardless of key
    if scenario.blob.len() < NONCE_SIZE {
        assert!(matches!(plain, Err(CryptoError::MalformedCiphertext { .. })));
    }
    if scenario.blob.len() < NONCE_SIZE + TAG_SIZE {
        assert!(matches!(authenticated, Err(CryptoError::MalformedCiphertext { .. })));
    }

    // INVARIANT 3: Both formats roundtrip
    let Ok(sealed) = seal(&scenario.plaintext, &scenario.key, scenario.nonce) else {
        panic!("seal with a valid key must succeed");
    };
    assert_eq!(open(&sealed, &scenario.key).ok(), Some(scenario.plaintext.clone()));

    let Ok(mut envelope) = seal_authenticated(&scenario.plaintext, &scenario.key, scenario.nonce)
    else {
        panic!("authenticated seal with a valid key must succeed");
    };
    assert_eq!(open_authenticated(&envelope, &scenario.key).ok(), Some(scenario.plaintext));

    // INVARIANT 4: Any single-byte corruption is caught
    let position = usize::from(scenario.flip_at) % envelope.len();
    envelope[position] ^= 0x01;
    assert_eq!(
        open_authenticated(&envelope, &scenario.key),
        Err(CryptoError::AuthenticationFailed)
    );
});
