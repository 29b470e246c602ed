//! lgtv-control library crate.
//!
//! This crate pairs with, powers on, and powers off an LG webOS television
//! over the local network:
//!
//! - **Pairing / power-off** use the TV's SSAP control protocol: JSON
//!   messages over a WebSocket connection to port 3000.  The TV issues an
//!   opaque *client key* on first pairing (the user confirms on-screen);
//!   later commands authenticate with that key.
//! - **Power-on** uses Wake-on-LAN: UDP magic packets pulsed at several
//!   target addresses, since a powered-down TV only listens with its NIC.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! lgtv-control <subcommand>
//!         ↕
//! [lgtv-control]
//!   ├── domain/           Pure types: DeviceConfig, SSAP envelopes, magic packet
//!   ├── application/      Command flows (pair, power_off, power_on, set_mac)
//!   └── infrastructure/
//!         ├── config_store/ JSON config file resolution + persistence
//!         ├── webos/        SSAP client (tokio-tungstenite)
//!         └── wol_sender/   UDP magic-packet transmission
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O, no async, no frameworks beyond `serde`.
//! - `application` depends on `domain` and the trait seams it defines
//!   (`ControlEndpoint`, `WolSender`); it never touches sockets directly.
//! - `infrastructure` implements the seams on top of `tokio-tungstenite`,
//!   `std::net::UdpSocket`, and the filesystem.
//!
//! This keeps every command flow unit-testable with recording fakes: the
//! tests can assert "power-off with an empty config performs no network
//! call" without ever opening a socket.

/// Domain layer: pure business-logic types (no I/O).
pub mod domain;

/// Application layer: command flows over trait seams.
pub mod application;

/// Infrastructure layer: config file, SSAP WebSocket client, UDP WoL sender.
pub mod infrastructure;
