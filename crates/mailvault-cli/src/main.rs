//! Mailvault command-line front end.
//!
//! # Usage
//!
//! ```bash
//! # alice sends bob a greeting, bob reads his mailbox
//! mailvault demo
//!
//! # Scripted exchange
//! mailvault exchange \
//!     --user alice:password123 --user bob:securepassword --user carol:pw \
//!     --send "alice:bob:Hello, Bob!" --send "carol:bob:Hi again" \
//!     --receive bob
//!
//! # Fast, unauthenticated payloads for experiments
//! mailvault --iterations 1000 --seal-mode plain demo
//! ```

mod script;

use std::num::NonZeroU32;

use clap::{Parser, Subcommand, ValueEnum};
use mailvault_core::{Engine, EngineConfig, SealMode};
use script::{Script, SendStep, UserStep};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Mailvault secure mailbox engine
#[derive(Parser, Debug)]
#[command(name = "mailvault")]
#[command(about = "Password-derived keys and encrypted per-user mailboxes")]
#[command(version)]
struct Args {
    /// PBKDF2-HMAC-SHA256 rounds
    #[arg(long, global = true, default_value = "100000")]
    iterations: NonZeroU32,

    /// Payload format for stored messages
    #[arg(long, global = true, value_enum, default_value_t = SealModeArg::EncryptThenMac)]
    seal_mode: SealModeArg,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register alice and bob, send "Hello, Bob!", print bob's mailbox
    Demo,

    /// Run a scripted exchange
    Exchange {
        /// User to register, as NAME:PASSWORD
        #[arg(long = "user", value_name = "NAME:PASSWORD")]
        users: Vec<UserStep>,

        /// Message to send, as FROM:TO:TEXT
        #[arg(long = "send", value_name = "FROM:TO:TEXT")]
        sends: Vec<SendStep>,

        /// Mailbox to print
        #[arg(long = "receive", value_name = "NAME")]
        receives: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SealModeArg {
    /// nonce || ciphertext, no tamper detection
    Plain,
    /// nonce || ciphertext || HMAC tag
    EncryptThenMac,
}

impl From<SealModeArg> for SealMode {
    fn from(arg: SealModeArg) -> Self {
        match arg {
            SealModeArg::Plain => Self::Plain,
            SealModeArg::EncryptThenMac => Self::EncryptThenMac,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = EngineConfig::default()
        .with_kdf_iterations(args.iterations)
        .with_seal_mode(args.seal_mode.into());
    let engine = Engine::with_config(config);

    let script = match args.command {
        Command::Demo => Script::demo(),
        Command::Exchange { users, sends, receives } => Script { users, sends, receives },
    };

    tracing::info!(
        users = script.users.len(),
        sends = script.sends.len(),
        receives = script.receives.len(),
        "running exchange"
    );

    let lines = script::run(&engine, &script).await?;
    print_lines(&lines);

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
