//! MAC address parsing and Wake-on-LAN magic-packet construction.
//!
//! A magic packet is 102 bytes: six `0xFF` synchronisation bytes followed by
//! sixteen repetitions of the target's 6-byte hardware address.  NICs in
//! low-power state scan every UDP datagram for this pattern, so the payload
//! alone matters; port and destination address are merely delivery hints.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Total length of a magic packet in bytes.
pub const MAGIC_PACKET_LEN: usize = 102;

/// Error type for MAC address parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacParseError {
    /// The address does not have six separator-delimited groups.
    #[error("expected 6 groups separated by ':' or '-', got {0}")]
    InvalidGroupCount(usize),

    /// A group is not exactly two hexadecimal digits.
    #[error("invalid octet '{0}'")]
    InvalidOctet(String),
}

/// An EUI-48 hardware address.
///
/// Parses from the common `AA:BB:CC:DD:EE:FF` notation; `-` separators are
/// accepted as well, and the two styles may be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// The raw six octets.
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddr {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = s.split(|c| c == ':' || c == '-').collect();
        if groups.len() != 6 {
            return Err(MacParseError::InvalidGroupCount(groups.len()));
        }

        let mut octets = [0u8; 6];
        for (octet, group) in octets.iter_mut().zip(&groups) {
            if group.len() != 2 {
                return Err(MacParseError::InvalidOctet((*group).to_string()));
            }
            *octet = u8::from_str_radix(group, 16)
                .map_err(|_| MacParseError::InvalidOctet((*group).to_string()))?;
        }
        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// The 102-byte Wake-on-LAN payload for one hardware address.
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    /// Builds the packet: 6 × `0xFF`, then 16 × the MAC.
    pub fn new(mac: MacAddr) -> Self {
        let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
        for repetition in 1..17 {
            packet[repetition * 6..repetition * 6 + 6].copy_from_slice(&mac.octets());
        }
        MagicPacket(packet)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Guesses the /24 directed-broadcast address for `ip`.
///
/// Returns `Some("a.b.c.255")` when `ip` has exactly four dot-separated
/// octets, `None` otherwise.  The guess assumes a /24 home network; sends to
/// it are best-effort and the caller swallows failures.
pub fn subnet_broadcast_guess(ip: &str) -> Option<String> {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    Some(format!("{}.{}.{}.255", parts[0], parts[1], parts[2]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_separated_mac() {
        let mac: MacAddr = "AA:BB:CC:DD:EE:FF".parse().expect("parse");
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn test_parse_hyphen_separated_mac() {
        let mac: MacAddr = "aa-bb-cc-dd-ee-ff".parse().expect("parse");
        assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
    }

    #[test]
    fn test_parse_mixed_separators() {
        assert!("AA:bb-CC:dd-EE:ff".parse::<MacAddr>().is_ok());
    }

    #[test]
    fn test_parse_rejects_gibberish() {
        assert!("hello".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_group_count() {
        assert_eq!(
            "AA:BB:CC:DD:EE".parse::<MacAddr>(),
            Err(MacParseError::InvalidGroupCount(5))
        );
    }

    #[test]
    fn test_parse_rejects_non_hex_octet() {
        assert_eq!(
            "AA:BB:CC:DD:EE:GG".parse::<MacAddr>(),
            Err(MacParseError::InvalidOctet("GG".to_string()))
        );
    }

    #[test]
    fn test_mac_display_round_trips() {
        let mac: MacAddr = "aa:bb:cc:dd:ee:ff".parse().expect("parse");
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(mac.to_string().parse::<MacAddr>(), Ok(mac));
    }

    #[test]
    fn test_magic_packet_layout() {
        // Arrange
        let mac: MacAddr = "AA:BB:CC:DD:EE:FF".parse().expect("parse");

        // Act
        let packet = MagicPacket::new(mac);
        let bytes = packet.as_bytes();

        // Assert — 6 sync bytes, then 16 repetitions of the MAC
        assert_eq!(bytes.len(), MAGIC_PACKET_LEN);
        assert_eq!(&bytes[..6], &[0xFF; 6]);
        for repetition in 1..17 {
            assert_eq!(
                &bytes[repetition * 6..repetition * 6 + 6],
                &mac.octets(),
                "repetition {repetition}"
            );
        }
    }

    #[test]
    fn test_subnet_guess_for_dotted_quad() {
        assert_eq!(
            subnet_broadcast_guess("192.168.1.50"),
            Some("192.168.1.255".to_string())
        );
    }

    #[test]
    fn test_subnet_guess_rejects_non_quad() {
        assert_eq!(subnet_broadcast_guess("tv.local"), None);
        assert_eq!(subnet_broadcast_guess("10.0.0"), None);
        assert_eq!(subnet_broadcast_guess("1.2.3.4.5"), None);
    }
}
