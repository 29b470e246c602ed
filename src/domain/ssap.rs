//! Message envelopes for the TV's SSAP control protocol.
//!
//! webOS televisions expose a control channel ("SSAP") on WebSocket port
//! 3000.  Every frame is a JSON object with a `"type"` discriminant:
//!
//! ```json
//! → {"type":"register","id":"...","payload":{ manifest, "client-key": ... }}
//! ← {"type":"response","id":"...","payload":{"pairingType":"PROMPT"}}
//! ← {"type":"registered","id":"...","payload":{"client-key":"a1b2c3..."}}
//! → {"type":"request","id":"...","uri":"ssap://system/turnOff"}
//! ← {"type":"response","id":"...","payload":{"returnValue":true}}
//! ```
//!
//! The `register` exchange is the pairing handshake: the first `response`
//! tells the client the TV is showing its on-screen accept prompt, and the
//! `registered` frame (sent after the user accepts, or immediately when a
//! valid client key was presented) carries the session credential.
//!
//! This module holds only the pure message types; the WebSocket transport
//! lives in `infrastructure::webos`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// WebSocket port of the SSAP control channel.
pub const CONTROL_PORT: u16 = 3000;

/// Request URI that powers the TV off.
pub const URI_TURN_OFF: &str = "ssap://system/turnOff";

/// Request URI for the current software information block.
///
/// The response payload carries `device_id`, the TV's hardware address;
/// pairing stores it as the Wake-on-LAN MAC.
pub const URI_CURRENT_SW_INFO: &str = "ssap://com.webos.service.update/getCurrentSWInformation";

// ── Client → TV ───────────────────────────────────────────────────────────────

/// An outgoing SSAP frame.
///
/// Built through the [`SsapRequest::register`] / [`SsapRequest::request`]
/// constructors; the `payload` of a register frame is the permission
/// manifest the TV displays during pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsapRequest {
    /// Frame discriminant: `"register"` or `"request"`.
    #[serde(rename = "type")]
    pub msg_type: &'static str,

    /// Correlation id echoed back in the TV's response.
    pub id: String,

    /// Target URI for `"request"` frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl SsapRequest {
    /// Builds the pairing/authentication handshake frame.
    ///
    /// With `client_key` present the TV re-authenticates silently; without
    /// it the TV shows the on-screen accept prompt and issues a fresh key.
    pub fn register(id: impl Into<String>, client_key: Option<&str>) -> Self {
        let mut payload = register_payload();
        if let Some(key) = client_key {
            payload["client-key"] = Value::from(key);
        }
        Self {
            msg_type: "register",
            id: id.into(),
            uri: None,
            payload: Some(payload),
        }
    }

    /// Builds a plain `"request"` frame for `uri` with no payload.
    pub fn request(id: impl Into<String>, uri: &'static str) -> Self {
        Self {
            msg_type: "request",
            id: id.into(),
            uri: Some(uri),
            payload: None,
        }
    }
}

/// The registration manifest sent with every `register` frame.
///
/// The permission list is what the TV shows the user in the accept prompt;
/// `CONTROL_POWER` covers `ssap://system/turnOff` and `READ_UPDATE_INFO`
/// covers the software-information request.
fn register_payload() -> Value {
    json!({
        "forcePairing": false,
        "pairingType": "PROMPT",
        "manifest": {
            "manifestVersion": 1,
            "permissions": [
                "LAUNCH",
                "CONTROL_POWER",
                "READ_INSTALLED_APPS",
                "READ_TV_CURRENT_CHANNEL",
                "READ_UPDATE_INFO",
                "READ_INPUT_DEVICE_LIST",
                "CONTROL_AUDIO",
                "CONTROL_INPUT_TV",
                "CONTROL_INPUT_MEDIA_PLAYBACK"
            ]
        }
    })
}

// ── TV → client ───────────────────────────────────────────────────────────────

/// An incoming SSAP frame.
///
/// Unknown payload shapes are kept as raw [`Value`]s: the TV's firmware
/// adds fields freely between versions and the tool only picks out the few
/// it needs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SsapResponse {
    /// Frame discriminant: `"response"`, `"registered"`, or `"error"`.
    #[serde(rename = "type")]
    pub msg_type: String,

    /// Correlation id of the request this frame answers, when present.
    #[serde(default)]
    pub id: Option<String>,

    /// Human-readable error description on `"error"` frames.
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub payload: Option<Value>,
}

impl SsapResponse {
    /// True for the frame that completes the registration handshake.
    pub fn is_registered(&self) -> bool {
        self.msg_type == "registered"
    }

    /// True while the TV is waiting for the user to accept the pairing prompt.
    pub fn is_pairing_prompt(&self) -> bool {
        self.msg_type == "response"
            && self
                .payload_str("pairingType")
                .is_some_and(|t| t == "PROMPT")
    }

    /// True for `"error"` frames.
    pub fn is_error(&self) -> bool {
        self.msg_type == "error"
    }

    /// The session credential carried by a `registered` frame.
    pub fn client_key(&self) -> Option<&str> {
        self.payload_str("client-key")
    }

    /// The `device_id` field of a software-information response.
    pub fn device_id(&self) -> Option<&str> {
        self.payload_str("device_id")
    }

    fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.as_ref()?.get(field)?.as_str()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
