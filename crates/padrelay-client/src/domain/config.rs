//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for runtime settings.  The
//! binary builds it by layering CLI arguments and environment variables over
//! an optional TOML file over [`RelayConfig::default`]; tests build it
//! directly.  Nothing in this module reads the environment or the filesystem.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use padrelay_core::RoomCode;
use serde::Deserialize;
use thiserror::Error;

/// Endpoint used when the target environment is [`TargetEnv::Production`].
pub const PRODUCTION_ENDPOINT: &str = "wss://remoteftc-api.lavallee.one/custom";

/// Endpoint used when the target environment is [`TargetEnv::Local`].
pub const LOCAL_ENDPOINT: &str = "ws://localhost:4000/custom";

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Which relay server to talk to when no explicit endpoint is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEnv {
    #[default]
    Production,
    Local,
}

impl TargetEnv {
    /// The well-known endpoint URL for this environment.
    pub fn endpoint_url(self) -> &'static str {
        match self {
            TargetEnv::Production => PRODUCTION_ENDPOINT,
            TargetEnv::Local => LOCAL_ENDPOINT,
        }
    }
}

impl fmt::Display for TargetEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEnv::Production => f.write_str("production"),
            TargetEnv::Local => f.write_str("local"),
        }
    }
}

/// Returned when a target environment name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target environment {0:?} (expected \"production\" or \"local\")")]
pub struct UnknownTargetEnv(pub String);

impl FromStr for TargetEnv {
    type Err = UnknownTargetEnv;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(TargetEnv::Production),
            "local" | "dev" => Ok(TargetEnv::Local),
            _ => Err(UnknownTargetEnv(s.to_string())),
        }
    }
}

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use padrelay_client::domain::{RelayConfig, TargetEnv};
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.target, TargetEnv::Production);
/// assert_eq!(cfg.poll_interval.as_millis(), 10);
/// assert_eq!(cfg.endpoint_url(), "wss://remoteftc-api.lavallee.one/custom");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Selects the well-known endpoint.
    pub target: TargetEnv,

    /// Explicit endpoint URL.  Wins over `target` when set.
    pub endpoint: Option<String>,

    /// Period of the poll tick.  Always non-zero.
    pub poll_interval: Duration,

    /// Room joined automatically once the channel opens.
    pub room: Option<RoomCode>,

    /// Fallback filter for the tracing subscriber when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for RelayConfig {
    /// | Field         | Default       |
    /// |---------------|---------------|
    /// | target        | `production`  |
    /// | endpoint      | none          |
    /// | poll_interval | 10 ms         |
    /// | room          | none          |
    /// | log_level     | `info`        |
    fn default() -> Self {
        Self {
            target: TargetEnv::default(),
            endpoint: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            room: None,
            log_level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// The URL the transport connects to.
    pub fn endpoint_url(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.target.endpoint_url())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
