//! Fuzz target for vault operation sequences
//!
//! Drives an engine with arbitrary register/send/receive/drain sequences and
//! checks it against a simple per-recipient queue model.
//!
//! # Invariants
//!
//! - No operation panics
//! - Registration succeeds exactly once per name
//! - Sends to or from unregistered names fail and change nothing
//! - Every mailbox reads back exactly the model queue, in order
//! - Drain returns the queue and leaves it empty

#![no_main]

use std::{collections::HashMap, num::NonZeroU32};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mailvault_core::{Engine, EngineConfig, SealMode, VaultError};

const NAMES: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Debug, Arbitrary)]
enum VaultOp {
    Register { who: u8 },
    Send { from: u8, to: u8, body: Vec<u8> },
    Receive { who: u8 },
    Drain { who: u8 },
}

#[derive(Debug, Arbitrary)]
struct VaultScenario {
    authenticated: bool,
    ops: Vec<VaultOp>,
}

fn name(index: u8) -> &'static str {
    NAMES[usize::from(index) % NAMES.len()]
}

fuzz_target!(|scenario: VaultScenario| {
    let mode = if scenario.authenticated { SealMode::EncryptThenMac } else { SealMode::Plain };
    let engine = Engine::with_config(
        EngineConfig::default().with_kdf_iterations(NonZeroU32::MIN).with_seal_mode(mode),
    );

    let mut model: HashMap<&str, Vec<(String, Vec<u8>)>> = HashMap::new();

    for op in scenario.ops.into_iter().take(64) {
        match op {
            VaultOp::Register { who } => {
                let who = name(who);
                let result = engine.register(who, who);
                if model.contains_key(who) {
                    assert!(matches!(result, Err(VaultError::UserExists { .. })));
                } else {
                    assert!(result.is_ok());
                    model.insert(who, Vec::new());
                }
            },

            VaultOp::Send { from, to, body } => {
                let (from, to) = (name(from), name(to));
                let result = engine.send(from, to, &body);
                if model.contains_key(from) && model.contains_key(to) {
                    assert!(result.is_ok());
                    if let Some(queue) = model.get_mut(to) {
                        queue.push((from.to_owned(), body));
                    }
                } else {
                    assert!(matches!(result, Err(VaultError::UnknownUser { .. })));
                }
            },

            VaultOp::Receive { who } => {
                let who = name(who);
                match (engine.receive(who), model.get(who)) {
                    (Ok(received), Some(queue)) => {
                        let received: Vec<(String, Vec<u8>)> =
                            received.into_iter().map(Into::into).collect();
                        assert_eq!(&received, queue);
                    },
                    (Err(VaultError::UnknownUser { .. }), None) => {},
                    (other, expected) => panic!("receive({who}) = {other:?}, model = {expected:?}"),
                }
            },

            VaultOp::Drain { who } => {
                let who = name(who);
                match (engine.drain(who), model.get_mut(who)) {
                    (Ok(drained), Some(queue)) => {
                        let drained: Vec<(String, Vec<u8>)> =
                            drained.into_iter().map(Into::into).collect();
                        assert_eq!(drained, std::mem::take(queue));
                    },
                    (Err(VaultError::UnknownUser { .. }), None) => {},
                    (other, expected) => panic!("drain({who}) = {other:?}, model = {expected:?}"),
                }
            },
        }
    }
});
