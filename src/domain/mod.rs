//! Domain layer: pure types with no I/O.
//!
//! - [`config`] — the persisted device configuration (`ip`, `mac`,
//!   `client_key`, plus round-tripped unknown keys).
//! - [`ssap`] — message envelopes and URIs for the TV's SSAP control
//!   protocol (JSON over WebSocket).
//! - [`wol`] — MAC address parsing and Wake-on-LAN magic-packet bytes.

pub mod config;
pub mod ssap;
pub mod wol;

pub use config::DeviceConfig;
pub use wol::{MacAddr, MagicPacket};
