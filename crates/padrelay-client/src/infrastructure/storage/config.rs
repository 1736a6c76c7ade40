//! TOML configuration file.
//!
//! Looked up at the platform-appropriate location unless a path is given:
//! - Windows:  `%APPDATA%\padrelay\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/padrelay/config.toml` or `~/.config/padrelay/config.toml`
//! - macOS:    `~/Library/Application Support/padrelay/config.toml`
//!
//! ```toml
//! [relay]
//! target = "local"                        # or "production"
//! endpoint = "ws://192.168.1.20:4000/custom"  # overrides target
//! poll_interval_ms = 10
//! room = 482913                           # auto-join once connected
//! log_level = "debug"
//! ```
//!
//! Every key is optional.  A missing file is the same as an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use padrelay_core::RoomCode;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::config::{RelayConfig, TargetEnv};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The poll interval was zero.
    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level file layout.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub relay: RelaySection,
}

/// The `[relay]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RelaySection {
    #[serde(default)]
    pub target: TargetEnv,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Validated on parse: six digits, no leading zero.
    #[serde(default)]
    pub room: Option<RoomCode>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_poll_interval_ms() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            target: TargetEnv::default(),
            endpoint: None,
            poll_interval_ms: default_poll_interval_ms(),
            room: None,
            log_level: default_log_level(),
        }
    }
}

impl FileConfig {
    /// Converts the file contents into a runtime config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroPollInterval`] if `poll_interval_ms` is 0.
    pub fn into_relay_config(self) -> Result<RelayConfig, ConfigError> {
        let relay = self.relay;
        if relay.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(RelayConfig {
            target: relay.target,
            endpoint: relay.endpoint.filter(|e| !e.trim().is_empty()),
            poll_interval: Duration::from_millis(relay.poll_interval_ms),
            room: relay.room,
            log_level: relay.log_level,
        })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the file at `path`, returning [`FileConfig::default`] if it does not
/// exist.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system errors other than "not found", and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_from(path: &Path) -> Result<FileConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the file at the platform default location.  A platform with no
/// config directory behaves like a missing file.
pub fn load_default() -> Result<FileConfig, ConfigError> {
    match config_file_path() {
        Ok(path) => load_from(&path),
        Err(ConfigError::NoPlatformConfigDir) => Ok(FileConfig::default()),
        Err(e) => Err(e),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("padrelay"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("padrelay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("padrelay")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
