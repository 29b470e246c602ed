//! SSAP control client over `tokio-tungstenite`.
//!
//! Implements the application's [`ControlEndpoint`] seam for real webOS
//! televisions.  One connection maps to one WebSocket session on the TV's
//! port 3000; the registration handshake runs immediately after the
//! WebSocket upgrade:
//!
//! ```text
//! connect_async(ws://tv:3000)            bounded by the connect timeout
//!   → register frame (± stored client key)
//!   ← response  {"pairingType":"PROMPT"}  user prompt is on screen
//!   ← registered {"client-key": ...}      user accepted / key was valid
//!   → request   getCurrentSWInformation   best-effort device-id fetch
//! ```
//!
//! Pairing (no stored key) waits up to [`PAIRING_TIMEOUT`] for the user to
//! walk to the remote and press "accept"; re-authentication with a stored
//! key either completes within [`REQUEST_TIMEOUT`] or leaves the connection
//! in the unauthenticated state for the power-off flow to report.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::Message as WsMessage,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::{ControlConnection, ControlEndpoint, ControlError};
use crate::domain::ssap::{self, SsapRequest, SsapResponse};

/// How long a fresh pairing waits for the user to accept the on-screen prompt.
pub const PAIRING_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on individual request/response exchanges after registration.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The state a registration exchange can be in after one TV frame.
#[derive(Debug, PartialEq)]
enum Registration {
    /// The TV is showing the accept prompt; keep waiting.
    Waiting,
    /// Registration completed with this session key.
    Registered(String),
    /// The TV refused (user denied, or the key was revoked).
    Rejected(String),
}

/// Interprets one incoming frame in the context of a pending registration.
fn registration_step(frame: &SsapResponse) -> Result<Registration, ControlError> {
    if frame.is_registered() {
        let key = frame
            .client_key()
            .ok_or_else(|| ControlError::Protocol("registered frame without client-key".into()))?;
        return Ok(Registration::Registered(key.to_string()));
    }
    if frame.is_error() {
        return Ok(Registration::Rejected(
            frame.error.clone().unwrap_or_else(|| "unknown error".into()),
        ));
    }
    // A plain "response" (the PROMPT notification, or any unrelated status
    // frame the TV interleaves) just means: not done yet.
    Ok(Registration::Waiting)
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// Production [`ControlEndpoint`] talking SSAP to a real TV.
#[derive(Debug, Clone)]
pub struct WebOsEndpoint {
    pairing_timeout: Duration,
}

impl WebOsEndpoint {
    pub fn new() -> Self {
        Self {
            pairing_timeout: PAIRING_TIMEOUT,
        }
    }
}

impl Default for WebOsEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

fn ssap_url(host: &str) -> String {
    format!("ws://{host}:{}/", ssap::CONTROL_PORT)
}

#[async_trait]
impl ControlEndpoint for WebOsEndpoint {
    async fn connect(
        &self,
        host: &str,
        client_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn ControlConnection>, ControlError> {
        let url = ssap_url(host);
        debug!("opening SSAP connection to {url}");

        let (ws, _response) = tokio::time::timeout(timeout, connect_async(&url))
            .await
            .map_err(|_| ControlError::ConnectTimeout {
                host: host.to_string(),
                timeout,
            })?
            .map_err(|e| ControlError::Connect {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        let mut conn = WebOsConnection {
            ws,
            client_key: None,
            device_id: None,
            authenticated: false,
        };

        conn.register(client_key, self.pairing_timeout).await?;

        if conn.authenticated {
            // Best effort: a TV that cannot answer the software-information
            // request is still perfectly controllable.
            if let Err(e) = conn.fetch_device_id().await {
                warn!("could not read device id from the TV: {e}");
            }
        }

        Ok(Box::new(conn))
    }
}

// ── Connection ────────────────────────────────────────────────────────────────

/// One open SSAP WebSocket session.
pub struct WebOsConnection {
    ws: WsStream,
    client_key: Option<String>,
    device_id: Option<String>,
    authenticated: bool,
}

impl WebOsConnection {
    /// Runs the registration handshake.
    ///
    /// With a presented key, rejection is *not* an error here: the
    /// connection simply stays unauthenticated and the power-off flow
    /// reports it.  Without a key (fresh pairing) rejection and timeout
    /// surface as errors.
    async fn register(
        &mut self,
        presented_key: Option<&str>,
        pairing_timeout: Duration,
    ) -> Result<(), ControlError> {
        let had_key = presented_key.is_some();
        let request = SsapRequest::register(Uuid::new_v4().to_string(), presented_key);
        self.send(&request).await?;

        // A presented key authenticates (or fails) quickly; a fresh pairing
        // waits for a human holding a remote.
        let wait = if had_key {
            REQUEST_TIMEOUT
        } else {
            pairing_timeout
        };

        let outcome = tokio::time::timeout(wait, async {
            loop {
                let frame = self.next_frame().await?;
                match registration_step(&frame)? {
                    Registration::Waiting => continue,
                    done => return Ok::<_, ControlError>(done),
                }
            }
        })
        .await;

        match outcome {
            Ok(Ok(Registration::Registered(key))) => {
                self.client_key = Some(key);
                self.authenticated = true;
                Ok(())
            }
            Ok(Ok(Registration::Rejected(reason))) if had_key => {
                debug!("stored client key rejected: {reason}");
                Ok(())
            }
            Ok(Ok(Registration::Rejected(reason))) => Err(ControlError::Rejected(reason)),
            Ok(Ok(Registration::Waiting)) => unreachable!("loop only exits on completion"),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) if had_key => Ok(()),
            Err(_elapsed) => Err(ControlError::PairingTimeout),
        }
    }

    /// Asks the TV for its software-information block and records the
    /// reported `device_id` (its hardware address).
    async fn fetch_device_id(&mut self) -> Result<(), ControlError> {
        let id = Uuid::new_v4().to_string();
        let request = SsapRequest::request(id.clone(), ssap::URI_CURRENT_SW_INFO);
        self.send(&request).await?;

        let response = self.await_response(&id, REQUEST_TIMEOUT).await?;
        self.device_id = response.device_id().map(str::to_string);
        Ok(())
    }

    /// Serializes and sends one frame.
    async fn send(&mut self, request: &SsapRequest) -> Result<(), ControlError> {
        let text = serde_json::to_string(request)
            .map_err(|e| ControlError::Protocol(format!("failed to encode frame: {e}")))?;
        self.ws
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| ControlError::Protocol(format!("failed to send frame: {e}")))
    }

    /// Reads the next SSAP frame, skipping transport-level chatter.
    async fn next_frame(&mut self) -> Result<SsapResponse, ControlError> {
        while let Some(frame) = self.ws.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    return serde_json::from_str(&text).map_err(|e| {
                        ControlError::Protocol(format!("malformed frame from TV: {e}"))
                    });
                }
                // Pings are answered by tungstenite itself; pongs and binary
                // frames carry nothing for us.
                Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Binary(_)) => continue,
                Ok(WsMessage::Close(_)) => return Err(ControlError::Closed),
                Ok(WsMessage::Frame(_)) => continue,
                Err(e) => return Err(ControlError::Protocol(e.to_string())),
            }
        }
        Err(ControlError::Closed)
    }

    /// Waits for the response frame matching `request_id`.
    async fn await_response(
        &mut self,
        request_id: &str,
        wait: Duration,
    ) -> Result<SsapResponse, ControlError> {
        tokio::time::timeout(wait, async {
            loop {
                let frame = self.next_frame().await?;
                if frame.id.as_deref() == Some(request_id) {
                    if frame.is_error() {
                        return Err(ControlError::Protocol(
                            frame.error.unwrap_or_else(|| "unknown error".into()),
                        ));
                    }
                    return Ok(frame);
                }
                // Unsolicited status frame; keep waiting for ours.
                debug!("ignoring unrelated frame while waiting for {request_id}");
            }
        })
        .await
        .map_err(|_| ControlError::Protocol(format!("no response to request {request_id}")))?
    }
}

#[async_trait]
impl ControlConnection for WebOsConnection {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    fn session_key(&self) -> Option<&str> {
        self.client_key.as_deref()
    }

    fn reported_device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    async fn power_off(&mut self) -> Result<(), ControlError> {
        let id = Uuid::new_v4().to_string();
        let request = SsapRequest::request(id.clone(), ssap::URI_TURN_OFF);
        self.send(&request).await?;
        self.await_response(&id, REQUEST_TIMEOUT).await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        // The TV drops the session on close anyway; a failed close frame
        // changes nothing for the flows.
        if let Err(e) = self.ws.close(None).await {
            debug!("error closing SSAP connection: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
