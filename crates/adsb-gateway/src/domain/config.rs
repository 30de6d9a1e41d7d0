//! Gateway configuration types.
//!
//! [`GatewayConfig`] is the single source of truth for all runtime settings.
//! It is populated from CLI arguments in `main` (with environment-variable
//! fallbacks) or from defaults; no code below `main` reads the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use adsb_core::TransponderIdentity;

/// All runtime configuration for the surveillance gateway.
///
/// Build this struct once at startup and wrap it in an `Arc` so it can be
/// shared cheaply across all session tasks.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// Defaults to loopback only; bind `0.0.0.0` to accept connections from
    /// the LAN.
    pub ws_bind_addr: SocketAddr,

    /// Path of the append-only sample log that receives the raw bytes of
    /// every successfully encoded frame.
    pub sample_path: PathBuf,

    /// The transponder identity stamped into every encoded frame.
    ///
    /// One identity is configured per process; each connection builds its
    /// own encoder instance from this value (see the session layer).
    pub identity: TransponderIdentity,
}

impl Default for GatewayConfig {
    /// Returns a `GatewayConfig` suitable for local development: loopback
    /// port 8080, samples in the working directory, and the stock identity.
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address string.
            ws_bind_addr: "127.0.0.1:8080".parse().unwrap(),
            sample_path: PathBuf::from("adsb_samples.bin"),
            identity: TransponderIdentity::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
