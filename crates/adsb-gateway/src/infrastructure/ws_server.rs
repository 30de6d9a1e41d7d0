//! WebSocket server: accept loop and per-session task management.
//!
//! Responsibilities:
//!
//! 1. Bind a TCP listener on the configured address.
//! 2. Accept incoming client connections until the shutdown flag clears.
//! 3. Upgrade each connection to a WebSocket session.
//! 4. Spawn one Tokio task per session so a slow client never blocks others.
//!
//! The one shared resource handed to every session is the [`SampleSink`];
//! it is constructed exactly once here so its internal mutex really is
//! process-wide.  Encoders, by contrast, are built per session from the
//! configured identity — sessions share configuration, never encoder state.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tracing::{error, info, warn};

use adsb_core::{ModeSEncoder, SurveillanceEncoder};

use crate::domain::config::GatewayConfig;
use crate::infrastructure::sample_sink::SampleSink;
use crate::infrastructure::session::ConnectionSession;

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.ws_bind_addr` and runs the accept loop until `running` is
/// cleared.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (port in use,
/// insufficient permissions).
pub async fn run_server(config: GatewayConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.ws_bind_addr))?;
    serve(listener, config, running).await
}

/// Runs the accept loop on an already-bound listener.
///
/// Split out from [`run_server`] so tests can bind port 0 and discover the
/// actual address via `listener.local_addr()` before serving.
///
/// # Errors
///
/// Returns an error if the listener's local address cannot be queried.
pub async fn serve(
    listener: TcpListener,
    config: GatewayConfig,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let local_addr = listener
        .local_addr()
        .context("listener has no local address")?;
    info!("surveillance gateway listening on {local_addr}");

    // The one sink instance for the whole process; every session appends
    // through the same mutex.
    let sink = Arc::new(SampleSink::new(config.sample_path.clone()));
    let config = Arc::new(config);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // A short timeout on accept() lets the loop observe the shutdown
        // flag even when no clients are connecting.
        match timeout(Duration::from_millis(200), listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new client connection from {peer_addr}");
                let config = Arc::clone(&config);
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, config, sink).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error; keep serving other clients.
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout — no new connection; loop back to the flag check.
            }
        }
    }

    Ok(())
}

// ── Per-connection entry point ────────────────────────────────────────────────

/// Upgrades one TCP connection to a WebSocket and runs its session to
/// completion, logging the outcome.  This outer function exists so
/// `ConnectionSession::run` can use `?` freely while nothing ever escapes
/// the per-connection task.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    config: Arc<GatewayConfig>,
    sink: Arc<SampleSink>,
) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed with {peer_addr}: {e}");
            return;
        }
    };

    // Per-session encoder instance: stateless calls, identity copied from
    // process configuration, nothing shared between sessions.
    let encoder: Arc<dyn SurveillanceEncoder> = Arc::new(ModeSEncoder::new(config.identity));

    let session = ConnectionSession::new(ws, peer_addr, encoder, sink);
    match session.run().await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}
