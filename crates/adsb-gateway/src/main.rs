//! ADS-B gateway — entry point.
//!
//! This binary accepts WebSocket connections from simulation clients and
//! turns their JSON surveillance-event descriptions into encoded Mode S
//! frames: the hexadecimal form goes back to the sender, the raw bytes go to
//! the shared sample log.
//!
//! # Usage
//!
//! ```text
//! adsb-gateway [OPTIONS]
//!
//! Options:
//!   --ws-port         <PORT>  WebSocket listener port [default: 8080]
//!   --ws-bind         <ADDR>  Bind address [default: 127.0.0.1]
//!   --samples-file    <PATH>  Sample log path [default: adsb_samples.bin]
//!   --icao            <HEX>   Transponder ICAO address [default: A1B2C3]
//!   --downlink-format <DF>    Mode S downlink format [default: 17]
//!   --capability      <CA>    Transponder capability code [default: 5]
//! ```
//!
//! # Environment variable overrides
//!
//! Every option also reads an environment variable; CLI args take
//! precedence when both are present.
//!
//! | Variable               | Default            |
//! |------------------------|--------------------|
//! | `ADSB_WS_PORT`         | `8080`             |
//! | `ADSB_WS_BIND`         | `127.0.0.1`        |
//! | `ADSB_SAMPLES_FILE`    | `adsb_samples.bin` |
//! | `ADSB_ICAO`            | `A1B2C3`           |
//! | `ADSB_DOWNLINK_FORMAT` | `17`               |
//! | `ADSB_CAPABILITY`      | `5`                |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use adsb_core::TransponderIdentity;
use adsb_gateway::domain::GatewayConfig;
use adsb_gateway::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// ADS-B surveillance gateway.
///
/// Accepts surveillance events as JSON over WebSocket, answers with encoded
/// Mode S frames in hexadecimal, and appends the raw frame bytes to the
/// sample log.
#[derive(Debug, Parser)]
#[command(
    name = "adsb-gateway",
    about = "WebSocket gateway encoding surveillance events into Mode S frames",
    version
)]
struct Cli {
    /// TCP port for the WebSocket server to listen on.
    #[arg(long, default_value_t = 8080, env = "ADSB_WS_PORT")]
    ws_port: u16,

    /// IP address to bind the WebSocket server to.
    ///
    /// Use `0.0.0.0` to accept connections from any interface.
    #[arg(long, default_value = "127.0.0.1", env = "ADSB_WS_BIND")]
    ws_bind: String,

    /// Path of the append-only sample log receiving raw frame bytes.
    #[arg(long, default_value = "adsb_samples.bin", env = "ADSB_SAMPLES_FILE")]
    samples_file: PathBuf,

    /// Transponder ICAO address as up to six hex digits.
    #[arg(long, default_value = "A1B2C3", env = "ADSB_ICAO")]
    icao: String,

    /// Mode S downlink format stamped into every frame (17 for aircraft
    /// extended squitter, 18 for non-transponder devices).
    #[arg(long, default_value_t = 17, env = "ADSB_DOWNLINK_FORMAT")]
    downlink_format: u8,

    /// Transponder capability code (3 bits).
    #[arg(long, default_value_t = 5, env = "ADSB_CAPABILITY")]
    capability: u8,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`GatewayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address does not parse, the ICAO string
    /// is not hexadecimal, or the identity fields are out of wire range.
    fn into_gateway_config(self) -> anyhow::Result<GatewayConfig> {
        let ws_bind_addr: SocketAddr = format!("{}:{}", self.ws_bind, self.ws_port)
            .parse()
            .with_context(|| {
                format!("invalid bind address: '{}:{}'", self.ws_bind, self.ws_port)
            })?;

        let icao_address = u32::from_str_radix(self.icao.trim_start_matches("0x"), 16)
            .with_context(|| format!("invalid ICAO address: '{}'", self.icao))?;

        let identity = TransponderIdentity::new(self.downlink_format, icao_address, self.capability)
            .context("invalid transponder identity")?;

        Ok(GatewayConfig {
            ws_bind_addr,
            sample_path: self.samples_file,
            identity,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, controlled via the RUST_LOG environment variable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_gateway_config()?;

    info!(
        "ADS-B gateway starting — ws={}, samples={}, icao={:06X}",
        config.ws_bind_addr,
        config.sample_path.display(),
        config.identity.icao_address
    );

    // Graceful shutdown: Ctrl+C clears the flag, the accept loop checks it
    // every 200 ms and exits cleanly.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("ADS-B gateway stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
