//! lgtv-control — entry point.
//!
//! Pairs with, powers on, and powers off an LG webOS television:
//!
//! ```text
//! lgtv-control auth <ip>      pair with the TV at <ip> and store the client key
//! lgtv-control on             pulse Wake-on-LAN packets for 30 seconds
//! lgtv-control off            power the TV off over the SSAP control channel
//! lgtv-control setmac <mac>   store a MAC address manually
//! ```
//!
//! # Exit codes
//!
//! | condition                                          | exit |
//! |----------------------------------------------------|------|
//! | normal completion                                  | 0    |
//! | missing config fields, corrupt config, I/O error   | 1    |
//! | invalid MAC / magic-packet send failure            | 1    |
//! | connection or pairing failure (`auth`, `off`)      | 0    |
//! | argument-parsing error (clap)                      | 2    |
//!
//! Connection failures exiting 0 is deliberate: the TV being off or
//! unreachable is an everyday condition, and automation built around this
//! tool keys off that exit code.
//!
//! # Logging
//!
//! Diagnostics go through `tracing`; set `RUST_LOG=debug` to see the SSAP
//! exchange.  User-facing prompts and results are plain stdout.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lgtv_control::application::{FlowError, PulseOptions, TvCommands};
use lgtv_control::infrastructure::{ConfigStore, UdpWolSender, WebOsEndpoint};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pair with, power on, and power off an LG webOS TV.
#[derive(Debug, Parser)]
#[command(name = "lgtv-control", about = "LG webOS TV control", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pair with the TV and store the issued client key.
    Auth {
        /// IP address of the TV.
        ip: String,
    },

    /// Turn the TV on by pulsing Wake-on-LAN magic packets.
    On,

    /// Turn the TV off over the control channel.
    Off,

    /// Store the TV's MAC address manually.
    Setmac {
        /// MAC address (e.g. AA:BB:CC:DD:EE:FF).
        mac: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    std::process::exit(run(cli).await);
}

/// Dispatches the parsed command and maps flow errors to exit codes.
async fn run(cli: Cli) -> i32 {
    let store = match ConfigStore::open() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };
    let commands = TvCommands::new(store, Arc::new(WebOsEndpoint::new()), Arc::new(UdpWolSender));

    match cli.command {
        Command::Auth { ip } => report(commands.pair(&ip).await),
        Command::On => report(commands.power_on(&PulseOptions::default())),
        Command::Off => report(commands.power_off().await),
        Command::Setmac { mac } => report(commands.set_mac(&mac)),
    }
}

/// Prints a flow error and picks its exit code.
///
/// Control-channel failures are reported but exit 0 (see the module docs);
/// everything else is fatal.
fn report(result: Result<(), FlowError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e @ FlowError::Control(_)) => {
            eprintln!("Error: {e}");
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
