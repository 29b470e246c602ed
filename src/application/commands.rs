//! The four command flows: pair, power-off, power-on, set-mac.
//!
//! This module is the heart of the tool.  Each flow is a short linear
//! sequence over two injected seams:
//!
//! - [`ControlEndpoint`] — opens authenticated SSAP connections to the TV
//!   (production: `infrastructure::webos`, tests: recording fakes);
//! - [`WolSender`] — transmits one magic packet to one target
//!   (production: `infrastructure::wol_sender`).
//!
//! All infrastructure implementations are injected at construction time,
//! making every flow fully unit-testable without a TV or a network.
//!
//! # Error policy
//!
//! Missing configuration is fatal ([`FlowError::NotConfigured`], exit 1).
//! Network and protocol failures during pairing or power-off are *not*
//! fatal: the dispatcher reports them and exits 0, because the TV being
//! unreachable is an everyday condition for this tool, not a defect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::wol::{subnet_broadcast_guess, MacParseError};
use crate::infrastructure::config_store::{ConfigError, ConfigStore};

/// Bound on establishing the SSAP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long power-on keeps pulsing magic packets.
pub const WOL_PULSE_DURATION: Duration = Duration::from_secs(30);

/// Delay between magic-packet pulses.
pub const WOL_PULSE_CADENCE: Duration = Duration::from_secs(1);

/// UDP ports magic packets are sent to, in send order.
///
/// Port 9 (discard) is the WoL convention; port 7 (echo) is a second
/// chance against routers that filter one of the two.
pub const WOL_PORTS: [u16; 2] = [9, 7];

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for an open SSAP connection or the attempt to open one.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The connection could not be established within the timeout.
    #[error("connection to {host} timed out after {timeout:?}")]
    ConnectTimeout { host: String, timeout: Duration },

    /// The connection could not be established at all.
    #[error("failed to connect to {host}: {reason}")]
    Connect { host: String, reason: String },

    /// The user did not accept the pairing prompt in time.
    #[error("timed out waiting for the pairing prompt to be accepted on the TV")]
    PairingTimeout,

    /// The TV rejected the registration (user pressed "deny", or the
    /// presented client key was revoked).
    #[error("pairing rejected by the TV: {0}")]
    Rejected(String),

    /// A malformed or unexpected frame on the control channel.
    #[error("control protocol error: {0}")]
    Protocol(String),

    /// The TV closed the connection mid-exchange.
    #[error("the TV closed the connection")]
    Closed,
}

/// Error type for magic-packet transmission.
#[derive(Debug, Error)]
pub enum WolError {
    /// The configured MAC address cannot be parsed.
    #[error("invalid MAC address '{address}': {source}")]
    InvalidMac {
        address: String,
        #[source]
        source: MacParseError,
    },

    /// The UDP send failed.
    #[error("failed to send magic packet: {0}")]
    Send(#[from] std::io::Error),
}

/// Error type shared by all command flows.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A required config field is missing.  Fatal: exit 1.
    #[error("not configured ({0} missing), run 'lgtv-control auth <ip>' first")]
    NotConfigured(&'static str),

    /// Config file unreadable, corrupt, or unwritable.  Fatal: exit 1.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Network/protocol failure talking to the TV.  Reported, exit 0.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// Magic-packet failure (bad MAC or socket error).  Fatal: exit 1.
    #[error(transparent)]
    Wol(#[from] WolError),
}

// ── Seams ─────────────────────────────────────────────────────────────────────

/// An open, possibly authenticated SSAP connection.
///
/// Mirrors the capability surface of the TV's control channel; the flows
/// never see WebSocket frames.
#[async_trait]
pub trait ControlConnection: Send {
    /// Whether the TV accepted the registration (fresh pairing or a valid
    /// stored client key).
    fn is_authenticated(&self) -> bool;

    /// The session credential issued or confirmed during registration.
    fn session_key(&self) -> Option<&str>;

    /// The hardware address the TV reported about itself, when available.
    fn reported_device_id(&self) -> Option<&str>;

    /// Issues the power-off command.
    async fn power_off(&mut self) -> Result<(), ControlError>;

    /// Releases the connection.  Infallible by design: the flows call this
    /// on every exit path and a close failure changes nothing for them.
    async fn disconnect(&mut self);
}

/// Opens SSAP connections to a television.
#[async_trait]
pub trait ControlEndpoint: Send + Sync {
    /// Connects to `host`, registers (pairing prompt when `client_key` is
    /// `None`, silent re-authentication otherwise), and returns the open
    /// connection.
    async fn connect(
        &self,
        host: &str,
        client_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Box<dyn ControlConnection>, ControlError>;
}

/// Sends a single Wake-on-LAN magic packet.
///
/// `target` of `None` means the global broadcast address.
pub trait WolSender: Send + Sync {
    fn send_magic_packet(&self, mac: &str, target: Option<&str>, port: u16)
        -> Result<(), WolError>;
}

// ── Power-on pulse options ────────────────────────────────────────────────────

/// Duration and cadence of the power-on pulse loop.
///
/// Parameters rather than constants so tests do not sleep for 30 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseOptions {
    pub duration: Duration,
    pub cadence: Duration,
}

impl Default for PulseOptions {
    fn default() -> Self {
        Self {
            duration: WOL_PULSE_DURATION,
            cadence: WOL_PULSE_CADENCE,
        }
    }
}

// ── Command flows ─────────────────────────────────────────────────────────────

/// The four command flows, wired to a config store and the two seams.
pub struct TvCommands {
    store: ConfigStore,
    control: Arc<dyn ControlEndpoint>,
    wol: Arc<dyn WolSender>,
}

impl TvCommands {
    pub fn new(
        store: ConfigStore,
        control: Arc<dyn ControlEndpoint>,
        wol: Arc<dyn WolSender>,
    ) -> Self {
        Self {
            store,
            control,
            wol,
        }
    }

    /// `auth <ip>` — pairs with the TV and stores the issued client key.
    ///
    /// The TV shows an on-screen accept prompt when the connection opens;
    /// this call blocks until the user answers or the pairing wait times
    /// out.  On success `{ip, mac, client_key}` are merged into the stored
    /// config: the MAC comes from the TV-reported device id, falling back
    /// to any previously stored MAC, else the empty-string placeholder.
    ///
    /// A failed handshake writes no config mutation.
    ///
    /// # Errors
    ///
    /// [`FlowError::Control`] on connection/pairing failure,
    /// [`FlowError::Config`] when the config cannot be read or written.
    pub async fn pair(&self, ip: &str) -> Result<(), FlowError> {
        println!("Connecting to {ip}...");
        println!("Please check your TV to accept the connection...");

        let mut conn = self.control.connect(ip, None, CONNECT_TIMEOUT).await?;

        // Pull everything the flow needs out of the connection, then release
        // it before acting on the results; the connection must not outlive
        // this block on any path.
        let session_key = conn.session_key().map(str::to_string);
        let device_id = conn.reported_device_id().map(str::to_string);
        conn.disconnect().await;

        let client_key = session_key
            .ok_or_else(|| ControlError::Rejected("no client key issued".to_string()))?;

        println!("Paired successfully!");
        println!("Client Key: {client_key}");

        let mut config = self.store.load()?;
        config.ip = Some(ip.to_string());
        config.mac = Some(match device_id {
            Some(id) if !id.is_empty() => id,
            _ => config.mac().unwrap_or_default().to_string(),
        });
        config.client_key = Some(client_key);
        self.store.save(&config)?;

        println!(
            "Configuration saved to {}",
            self.store.write_path().display()
        );
        Ok(())
    }

    /// `off` — powers the TV off over the control channel.
    ///
    /// # Errors
    ///
    /// [`FlowError::NotConfigured`] when `ip` or `client_key` is missing
    /// (checked before any network call), [`FlowError::Control`] on
    /// connect failure.
    ///
    /// A connection that opens but does not authenticate is reported and
    /// treated as success: automation built around this tool keys off the
    /// exit code, so the long-standing quirk is preserved deliberately.
    pub async fn power_off(&self) -> Result<(), FlowError> {
        let config = self.store.load()?;
        let (Some(ip), Some(client_key)) = (config.ip(), config.client_key()) else {
            return Err(FlowError::NotConfigured("ip/client_key"));
        };

        let mut conn = self
            .control
            .connect(ip, Some(client_key), CONNECT_TIMEOUT)
            .await?;

        if !conn.is_authenticated() {
            println!("Authentication failed or could not connect.");
            conn.disconnect().await;
            return Ok(());
        }

        println!("Sending Power Off command...");
        let result = conn.power_off().await;
        conn.disconnect().await;
        result?;

        info!("power-off command delivered to {ip}");
        Ok(())
    }

    /// `on` — pulses Wake-on-LAN magic packets for the configured duration.
    ///
    /// Once per cadence tick, packets go to the global broadcast address,
    /// to the stored IP (when known), and to a guessed /24 directed
    /// broadcast (when the IP is a dotted quad), each on ports 9 and 7.
    /// The redundancy compensates for home networks that drop one delivery
    /// path or another; the subnet guess is best-effort and its failures
    /// are swallowed.
    ///
    /// This is a plain blocking sleep loop; there is no awaited I/O here.
    ///
    /// # Errors
    ///
    /// [`FlowError::NotConfigured`] when no MAC is stored,
    /// [`FlowError::Wol`] when the MAC is unparsable or a non-best-effort
    /// send fails.
    pub fn power_on(&self, options: &PulseOptions) -> Result<(), FlowError> {
        let config = self.store.load()?;
        let Some(mac) = config.mac() else {
            return Err(FlowError::NotConfigured("mac"));
        };
        let ip = config.ip();

        println!(
            "Sending pulsed WoL packets to {mac} for {} seconds...",
            options.duration.as_secs()
        );
        println!("Addresses: Global (255.255.255.255), Subnet (x.x.x.255), and Unicast");

        let start = Instant::now();
        while start.elapsed() < options.duration {
            self.pulse_once(mac, ip)?;
            std::thread::sleep(options.cadence);
        }

        println!("WoL packet pulsing finished.");
        Ok(())
    }

    /// Sends one tick's worth of magic packets.
    ///
    /// 2 packets without a known IP, 6 with one (global + unicast + subnet
    /// guess, × 2 ports each).
    fn pulse_once(&self, mac: &str, ip: Option<&str>) -> Result<(), FlowError> {
        for port in WOL_PORTS {
            self.wol.send_magic_packet(mac, None, port)?;
        }

        if let Some(ip) = ip {
            for port in WOL_PORTS {
                self.wol.send_magic_packet(mac, Some(ip), port)?;
            }

            if let Some(broadcast) = subnet_broadcast_guess(ip) {
                for port in WOL_PORTS {
                    // Best effort: the guessed /24 may simply be wrong.
                    if let Err(e) = self.wol.send_magic_packet(mac, Some(&broadcast), port) {
                        debug!("subnet-broadcast send to {broadcast}:{port} failed: {e}");
                    }
                }
            }
        }
        Ok(())
    }

    /// `setmac <mac>` — stores the MAC address verbatim.
    ///
    /// Merges into the existing config; `ip` and `client_key` are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`FlowError::Config`] when the config cannot be read or written.
    pub fn set_mac(&self, mac: &str) -> Result<(), FlowError> {
        let mut config = self.store.load()?;
        config.mac = Some(mac.to_string());
        self.store.save(&config)?;
        println!("MAC address saved: {mac}");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
