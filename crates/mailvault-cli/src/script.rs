//! Scripted exchanges: register users, send messages, read mailboxes.
//!
//! Steps run in a fixed order: every registration, then every send, then
//! every receive. Output lines are returned rather than printed so the
//! binary decides where they go.

use std::str::FromStr;

use mailvault_core::{Engine, VaultError};
use thiserror::Error;

/// Command-line step that did not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {what} '{input}': expected {expected}")]
pub struct StepParseError {
    what: &'static str,
    input: String,
    expected: &'static str,
}

/// `NAME:PASSWORD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStep {
    /// Username
    pub name: String,
    /// Password (may itself contain ':')
    pub password: String,
}

impl FromStr for UserStep {
    type Err = StepParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once(':') {
            Some((name, password)) if !name.is_empty() => {
                Ok(Self { name: name.to_owned(), password: password.to_owned() })
            },
            _ => Err(StepParseError { what: "user", input: input.to_owned(), expected: "NAME:PASSWORD" }),
        }
    }
}

/// `FROM:TO:TEXT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStep {
    /// Sending user
    pub from: String,
    /// Receiving user
    pub to: String,
    /// Message text (may itself contain ':')
    pub text: String,
}

impl FromStr for SendStep {
    type Err = StepParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(from), Some(to), Some(text)) if !from.is_empty() && !to.is_empty() => {
                Ok(Self { from: from.to_owned(), to: to.to_owned(), text: text.to_owned() })
            },
            _ => Err(StepParseError { what: "send", input: input.to_owned(), expected: "FROM:TO:TEXT" }),
        }
    }
}

/// A full exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// Users to register
    pub users: Vec<UserStep>,
    /// Messages to send
    pub sends: Vec<SendStep>,
    /// Mailboxes to print
    pub receives: Vec<String>,
}

impl Script {
    /// alice and bob exchanging a single greeting.
    pub fn demo() -> Self {
        Self {
            users: vec![
                UserStep { name: "alice".to_owned(), password: "password123".to_owned() },
                UserStep { name: "bob".to_owned(), password: "securepassword".to_owned() },
            ],
            sends: vec![SendStep {
                from: "alice".to_owned(),
                to: "bob".to_owned(),
                text: "Hello, Bob!".to_owned(),
            }],
            receives: vec!["bob".to_owned()],
        }
    }
}

/// Run `script` against `engine`, returning one line per received message.
///
/// Key derivation and encryption run on the blocking pool.
///
/// # Errors
///
/// First engine error encountered; later steps are not run.
pub async fn run(engine: &Engine, script: &Script) -> Result<Vec<String>, VaultError> {
    for user in &script.users {
        engine.register_offloaded(user.name.as_str(), user.password.as_str()).await?;
    }

    for send in &script.sends {
        engine
            .send_offloaded(send.from.as_str(), send.to.as_str(), send.text.as_bytes())
            .await?;
    }

    let mut lines = Vec::new();
    for recipient in &script.receives {
        for received in engine.receive_offloaded(recipient.as_str()).await? {
            lines.push(format!(
                "Message from {}: {}",
                received.sender,
                String::from_utf8_lossy(&received.message)
            ));
        }
    }
    Ok(lines)
}
