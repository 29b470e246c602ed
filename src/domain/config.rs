//! The persisted device configuration.
//!
//! A single flat JSON object with at most three well-known string fields:
//!
//! ```json
//! {
//!     "ip": "192.168.1.50",
//!     "mac": "AA:BB:CC:DD:EE:FF",
//!     "client_key": "a1b2c3d4..."
//! }
//! ```
//!
//! All fields are optional until first populated: `auth` sets all three,
//! `setmac` sets `mac` only, and nothing is ever deleted automatically.
//! Keys this version does not recognise are captured in [`DeviceConfig::extra`]
//! via `#[serde(flatten)]` so that load→save round-trips them unchanged:
//! an older or newer build of the tool must never destroy another build's
//! fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored pairing and addressing state for one television.
///
/// # Field presence
///
/// The flows treat an *empty string* the same as an absent field: pairing
/// writes `"mac": ""` when the TV reports no device identifier and none was
/// stored before, and that placeholder must not satisfy the power-on
/// precondition.  Use the accessor methods ([`DeviceConfig::ip`] etc.) rather
/// than reading the `Option` fields directly when checking preconditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Dotted-quad address of the television.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Hardware address used for Wake-on-LAN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,

    /// Opaque session credential issued by the TV during pairing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,

    /// Unrecognised keys, preserved across load/save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceConfig {
    /// The stored IP address, if present and non-empty.
    pub fn ip(&self) -> Option<&str> {
        non_empty(&self.ip)
    }

    /// The stored MAC address, if present and non-empty.
    pub fn mac(&self) -> Option<&str> {
        non_empty(&self.mac)
    }

    /// The stored client key, if present and non-empty.
    pub fn client_key(&self) -> Option<&str> {
        non_empty(&self.client_key)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_fields() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.ip(), None);
        assert_eq!(cfg.mac(), None);
        assert_eq!(cfg.client_key(), None);
        assert!(cfg.extra.is_empty());
    }

    #[test]
    fn test_empty_string_field_counts_as_absent() {
        // Arrange: pairing can persist "mac": "" as a placeholder
        let cfg = DeviceConfig {
            mac: Some(String::new()),
            ..DeviceConfig::default()
        };

        // Assert
        assert_eq!(cfg.mac(), None);
    }

    #[test]
    fn test_absent_fields_are_omitted_from_json() {
        // Arrange
        let cfg = DeviceConfig {
            mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
            ..DeviceConfig::default()
        };

        // Act
        let json = serde_json::to_string(&cfg).expect("serialize");

        // Assert — absent fields must not appear as nulls
        assert!(!json.contains("ip"));
        assert!(!json.contains("client_key"));
        assert!(json.contains("AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        // Arrange
        let cfg = DeviceConfig {
            ip: Some("192.168.1.50".to_string()),
            mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
            client_key: Some("secret".to_string()),
            extra: Map::new(),
        };

        // Act
        let json = serde_json::to_string_pretty(&cfg).expect("serialize");
        let restored: DeviceConfig = serde_json::from_str(&json).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_round_trip_preserves_unknown_keys() {
        // Arrange: a config written by some other (newer) build of the tool
        let json = r#"{"ip":"10.0.0.2","wol_port_override":7,"notes":"living room"}"#;

        // Act
        let cfg: DeviceConfig = serde_json::from_str(json).expect("deserialize");
        let rewritten = serde_json::to_string(&cfg).expect("serialize");
        let restored: DeviceConfig = serde_json::from_str(&rewritten).expect("re-deserialize");

        // Assert
        assert_eq!(cfg.ip(), Some("10.0.0.2"));
        assert_eq!(cfg.extra.get("wol_port_override"), Some(&Value::from(7)));
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_empty_object_is_default() {
        let cfg: DeviceConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(cfg, DeviceConfig::default());
    }
}
