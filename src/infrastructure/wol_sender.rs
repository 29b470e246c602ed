//! UDP magic-packet transmission.
//!
//! Implements the application's [`WolSender`] seam over a plain
//! `std::net::UdpSocket`.  Blocking on purpose: power-on is a synchronous
//! sleep loop with no other I/O in flight, so an async socket would buy
//! nothing.

use std::net::UdpSocket;

use crate::application::{WolError, WolSender};
use crate::domain::{MacAddr, MagicPacket};

/// The global broadcast address, used when no target is given.
pub const GLOBAL_BROADCAST: &str = "255.255.255.255";

/// Production [`WolSender`] over UDP.
#[derive(Debug, Default)]
pub struct UdpWolSender;

impl WolSender for UdpWolSender {
    fn send_magic_packet(
        &self,
        mac: &str,
        target: Option<&str>,
        port: u16,
    ) -> Result<(), WolError> {
        let parsed: MacAddr = mac.parse().map_err(|source| WolError::InvalidMac {
            address: mac.to_string(),
            source,
        })?;
        let packet = MagicPacket::new(parsed);

        // An ephemeral socket per packet: at one pulse per second the setup
        // cost is irrelevant, and SO_BROADCAST stays scoped to each send.
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_broadcast(true)?;

        let destination = target.unwrap_or(GLOBAL_BROADCAST);
        socket.send_to(packet.as_bytes(), (destination, port))?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mac_is_rejected_before_any_socket_work() {
        let sender = UdpWolSender;
        let result = sender.send_magic_packet("not-a-mac", None, 9);
        assert!(matches!(result, Err(WolError::InvalidMac { .. })));
    }

    #[test]
    fn test_unicast_send_to_loopback_succeeds() {
        // Loopback delivery needs no network and no listener: UDP sends
        // succeed whether or not anything receives the datagram.
        let sender = UdpWolSender;
        sender
            .send_magic_packet("AA:BB:CC:DD:EE:FF", Some("127.0.0.1"), 9)
            .expect("send to loopback");
    }
}
