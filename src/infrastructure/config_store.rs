//! JSON-based configuration persistence.
//!
//! The device configuration lives at one of three candidate paths:
//!
//! 1. `/etc/lgtv-control/config.json` — system-wide, written when running
//!    with elevated privileges (so a root-installed systemd unit and an
//!    interactive `sudo lgtv-control auth` agree on one file);
//! 2. `$XDG_CONFIG_HOME/lgtv-control/config.json` (or
//!    `~/.config/lgtv-control/config.json`) — user-scoped;
//! 3. `./lgtv_config.json` — current-directory fallback.
//!
//! Reads probe the candidates in that order and take the first that exists;
//! writes go deterministically to the system path under elevated privileges
//! and to the user path otherwise, with no filesystem probing on the write side.
//!
//! Privilege level and candidate paths are plain constructor parameters
//! rather than process-wide state, which keeps every resolution rule
//! unit-testable.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::DeviceConfig;

/// System-wide config location, used when running as root.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/lgtv-control/config.json";

/// File name of the current-directory fallback.
pub const FALLBACK_CONFIG_FILE: &str = "lgtv_config.json";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The user config directory could not be determined from the environment.
    #[error("could not determine the user config directory (HOME unset?)")]
    NoUserConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid JSON.
    #[error("config file at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config could not be serialized to JSON.
    #[error("failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}

// ── Candidate path resolution ─────────────────────────────────────────────────

/// The ordered config file candidates: system, user, fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePaths {
    pub system: PathBuf,
    pub user: PathBuf,
    pub fallback: PathBuf,
}

impl CandidatePaths {
    /// Resolves the standard candidate set from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUserConfigDir`] when neither
    /// `XDG_CONFIG_HOME` nor `HOME` is set.
    pub fn discover() -> Result<Self, ConfigError> {
        Ok(Self {
            system: PathBuf::from(SYSTEM_CONFIG_PATH),
            user: user_config_path().ok_or(ConfigError::NoUserConfigDir)?,
            fallback: PathBuf::from(FALLBACK_CONFIG_FILE),
        })
    }

    /// The candidates in read-probe order.
    fn in_read_order(&self) -> [&Path; 3] {
        [&self.system, &self.user, &self.fallback]
    }
}

/// Resolves the user-scoped config file path.
///
/// `XDG_CONFIG_HOME` takes precedence over `~/.config`, matching every
/// other XDG-aware tool on the system.
fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("lgtv-control").join("config.json"))
}

/// Whether the process runs with elevated privileges (effective UID 0).
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid is always safe to call and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

// ── Config store ──────────────────────────────────────────────────────────────

/// Loads and saves the [`DeviceConfig`] at the resolved candidate paths.
pub struct ConfigStore {
    paths: CandidatePaths,
    elevated: bool,
}

impl ConfigStore {
    /// Opens the store with environment-resolved paths and the real
    /// privilege level.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUserConfigDir`] when the user config
    /// directory cannot be determined.
    pub fn open() -> Result<Self, ConfigError> {
        Ok(Self::new(CandidatePaths::discover()?, is_elevated()))
    }

    /// Builds a store over explicit paths and privilege level.
    pub fn new(paths: CandidatePaths, elevated: bool) -> Self {
        Self { paths, elevated }
    }

    /// The path writes go to: system-wide when elevated, else user-scoped.
    ///
    /// Deterministic; no filesystem probing.
    pub fn write_path(&self) -> &Path {
        if self.elevated {
            &self.paths.system
        } else {
            &self.paths.user
        }
    }

    /// The path reads come from: the first existing candidate, else the
    /// fallback (which then does not exist; `load` maps that to an empty
    /// config).
    pub fn read_path(&self) -> PathBuf {
        self.read_path_with(|p| p.exists())
    }

    /// [`read_path`](Self::read_path) with an injectable existence probe.
    pub fn read_path_with(&self, exists: impl Fn(&Path) -> bool) -> PathBuf {
        self.paths
            .in_read_order()
            .into_iter()
            .find(|p| exists(p))
            .unwrap_or(&self.paths.fallback)
            .to_path_buf()
    }

    /// Loads the device configuration.
    ///
    /// A missing file is not an error: first runs start from an empty
    /// config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Corrupt`] when the file exists but is not
    /// valid JSON, and [`ConfigError::Io`] for other filesystem failures.
    pub fn load(&self) -> Result<DeviceConfig, ConfigError> {
        let path = self.read_path();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| ConfigError::Corrupt { path, source })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DeviceConfig::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Persists the device configuration to [`write_path`](Self::write_path)
    /// as pretty-printed JSON.
    ///
    /// Creates the parent directory if it does not exist (idempotent).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for filesystem failures and
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError> {
        let path = self.write_path();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
