//! Infrastructure layer: filesystem and network implementations.
//!
//! - [`config_store`] — JSON config persistence with system/user/fallback
//!   path resolution.
//! - [`webos`] — SSAP control client over `tokio-tungstenite`, implementing
//!   the application's [`ControlEndpoint`](crate::application::ControlEndpoint)
//!   seam.
//! - [`wol_sender`] — UDP magic-packet transmission, implementing the
//!   [`WolSender`](crate::application::WolSender) seam.

pub mod config_store;
pub mod webos;
pub mod wol_sender;

pub use config_store::{CandidatePaths, ConfigError, ConfigStore};
pub use webos::WebOsEndpoint;
pub use wol_sender::UdpWolSender;
