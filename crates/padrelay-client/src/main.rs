//! padrelay: entry point.
//!
//! Relays the state of up to two local game controllers to a remote room over
//! WebSocket, every poll period, until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! padrelay [OPTIONS]
//!
//! Options:
//!   --config <PATH>            TOML config file [default: platform config dir]
//!   --env <ENV>                production | local [default: production]
//!   --endpoint <URL>           Relay server URL (overrides --env)
//!   --poll-interval-ms <MS>    Poll period in milliseconds [default: 10]
//!   --room <CODE>              Join this room as soon as the connection opens
//!   --log-level <FILTER>       Log filter when RUST_LOG is unset [default: info]
//! ```
//!
//! While running, type a six-digit room code and press Enter to join a room.
//! On each controller, hold Start+A to become player 1 or Start+B to become
//! player 2.
//!
//! # Configuration precedence
//!
//! CLI arguments, then environment variables, then the config file, then the
//! built-in defaults.
//!
//! | Variable                    | Setting            |
//! |-----------------------------|--------------------|
//! | `PADRELAY_CONFIG`           | `--config`         |
//! | `PADRELAY_ENV`              | `--env`            |
//! | `PADRELAY_ENDPOINT`         | `--endpoint`       |
//! | `PADRELAY_POLL_INTERVAL_MS` | `--poll-interval-ms` |
//! | `PADRELAY_ROOM`             | `--room`           |
//! | `PADRELAY_LOG`              | `--log-level`      |
//!
//! # Runtime model
//!
//! One thread.  A `current_thread` tokio runtime drives a single
//! `tokio::select!` loop over the poll interval, connection events, stdin
//! lines, and Ctrl+C.  The WebSocket task runs on the same thread.  The gilrs
//! context is not `Send` and lives inside the loop's future.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use padrelay_client::application::{Relay, RelayEvent};
use padrelay_client::domain::{RelayConfig, TargetEnv};
use padrelay_client::infrastructure::device_source::gilrs::GilrsSource;
use padrelay_client::infrastructure::storage::config::{load_default, load_from, FileConfig};
use padrelay_client::infrastructure::transport::ws;
use padrelay_core::RoomCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long to wait for the close handshake and stdin reader at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relays local game controllers to a remote room over WebSocket.
#[derive(Debug, Parser)]
#[command(name = "padrelay", version)]
struct Cli {
    /// TOML config file.  Missing file means defaults.
    #[arg(long, env = "PADRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Relay server environment: `production` or `local`.
    #[arg(long = "env", env = "PADRELAY_ENV")]
    target: Option<TargetEnv>,

    /// Relay server URL.  Overrides `--env`.
    #[arg(long, env = "PADRELAY_ENDPOINT")]
    endpoint: Option<String>,

    /// Poll period in milliseconds.  Must be greater than zero.
    #[arg(long, env = "PADRELAY_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Six-digit room code to join once connected.
    #[arg(long, env = "PADRELAY_ROOM")]
    room: Option<RoomCode>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "PADRELAY_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// Layers the parsed arguments over the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if either layer sets a zero poll interval.
    fn into_relay_config(self, file: FileConfig) -> anyhow::Result<RelayConfig> {
        let mut config = file
            .into_relay_config()
            .context("invalid configuration file")?;

        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = Some(endpoint);
        }
        if let Some(ms) = self.poll_interval_ms {
            if ms == 0 {
                bail!("--poll-interval-ms must be greater than zero");
            }
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(room) = self.room {
            config.room = Some(room);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => load_from(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => load_default().context("failed to load config file")?,
    };
    let config = cli.into_relay_config(file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "padrelay starting: endpoint={}, poll={:?}",
        config.endpoint_url(),
        config.poll_interval
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(run(config));
    // tokio's stdin reader is a blocking thread that cannot be interrupted.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    info!("padrelay stopped");
    result
}

async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let source = GilrsSource::new().context("failed to open game controller backend")?;
    let mut relay = Relay::new(source, config.room);

    let ws::WsConnection {
        sink,
        mut events,
        task,
    } = ws::connect(config.endpoint_url());
    relay.attach(Box::new(sink));

    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_status = relay.status();
    info!("{last_status}");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                relay.dispatch(RelayEvent::Tick);
            }

            event = events.recv() => match event {
                Some(event) => {
                    relay.dispatch(RelayEvent::Channel(event));
                }
                None => {
                    warn!("connection to relay server is gone; exiting");
                    break;
                }
            },

            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => {
                    relay.dispatch(RelayEvent::JoinRequest(line));
                }
                Ok(None) => {
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("stdin unavailable: {e}");
                    stdin_open = false;
                }
            },

            res = &mut ctrl_c => {
                if let Err(e) = res {
                    warn!("failed to listen for Ctrl+C: {e}");
                }
                info!("received Ctrl+C, shutting down");
                break;
            }
        }

        let status = relay.status();
        if status != last_status {
            info!("{status}");
            last_status = status;
        }
    }

    relay.dispatch(RelayEvent::Shutdown);
    drop(relay);

    // Give the connection task a moment to send the close frame.
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, task).await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
