//! Per-connection session handling.
//!
//! One [`ConnectionSession`] drives one client channel from acceptance to
//! closure.  Processing is strictly sequential within a session — the
//! channel receive is the only suspension point in the loop, so requests and
//! responses keep their order — while sessions themselves run concurrently
//! on independent tasks.
//!
//! The per-message policy:
//!
//! - Undecodable payloads earn a failure envelope and the session continues;
//!   one bad message never costs the connection.
//! - The handshake (`{"type":"init"}`) is stateless: it may arrive at any
//!   time, repeatedly, and always earns the same acknowledgment.
//! - Everything else goes through the router, and the resulting sample batch
//!   is handed to the sink *after* the response is on the wire, as a
//!   detached task.
//! - Normal peer disconnect ends the session silently; abnormal closure is
//!   reported to the caller, which logs it.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use adsb_core::SurveillanceEncoder;

use crate::application::router::{route, RouteOutcome};
use crate::domain::messages::{ControlMessage, ResponseEnvelope};
use crate::infrastructure::sample_sink::SampleSink;

/// The state machine for one accepted client connection.
pub struct ConnectionSession {
    ws: WebSocketStream<TcpStream>,
    peer_addr: SocketAddr,
    /// Correlates this session's log lines; peer addresses repeat, ids don't.
    session_id: Uuid,
    encoder: Arc<dyn SurveillanceEncoder>,
    sink: Arc<SampleSink>,
}

impl ConnectionSession {
    pub fn new(
        ws: WebSocketStream<TcpStream>,
        peer_addr: SocketAddr,
        encoder: Arc<dyn SurveillanceEncoder>,
        sink: Arc<SampleSink>,
    ) -> Self {
        Self {
            ws,
            peer_addr,
            session_id: Uuid::new_v4(),
            encoder,
            sink,
        }
    }

    /// Runs the session until the peer disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error only for abnormal channel failures (transport error,
    /// failed send).  A normal close — peer disconnect or Close frame — is
    /// `Ok(())`.
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(
            "session {} established for {}",
            self.session_id, self.peer_addr
        );

        loop {
            let ws_msg = match self.ws.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                    debug!("session {}: channel closed normally", self.session_id);
                    break;
                }
                Some(Err(e)) => {
                    return Err(e).with_context(|| {
                        format!("session {}: channel receive failed", self.session_id)
                    });
                }
                None => {
                    debug!("session {}: stream ended", self.session_id);
                    break;
                }
            };

            match ws_msg {
                WsMessage::Text(text) => self.handle_payload(&text).await?,

                WsMessage::Binary(bytes) => {
                    // Some clients send the same JSON as a binary frame;
                    // non-UTF-8 content is simply an undecodable payload.
                    match std::str::from_utf8(&bytes) {
                        Ok(text) => self.handle_payload(text).await?,
                        Err(_) => {
                            self.send(ResponseEnvelope::failure("invalid payload encoding"))
                                .await?;
                        }
                    }
                }

                WsMessage::Ping(data) => {
                    // Protocol-level ping; tokio-tungstenite queues the Pong
                    // reply automatically.
                    debug!("session {}: ping ({} bytes)", self.session_id, data.len());
                }

                WsMessage::Pong(_) => {
                    debug!("session {}: pong received", self.session_id);
                }

                WsMessage::Close(_) => {
                    debug!("session {}: close frame received", self.session_id);
                    break;
                }

                WsMessage::Frame(_) => {
                    debug!("session {}: raw frame (ignored)", self.session_id);
                }
            }
        }

        Ok(())
    }

    /// Processes one inbound payload and sends exactly one reply.
    async fn handle_payload(&mut self, text: &str) -> anyhow::Result<()> {
        let RouteOutcome {
            envelope,
            sample_batch,
        } = process_payload(text, self.encoder.as_ref());

        if let ResponseEnvelope::Failure { reason, .. } = &envelope {
            warn!("session {}: rejected message: {reason}", self.session_id);
        }

        // Respond first; persistence is a detached side effect and must
        // never delay or fail the reply.
        self.send(envelope).await?;

        if let Some(batch) = sample_batch {
            self.sink.append_detached(batch, self.session_id);
        }
        Ok(())
    }

    async fn send(&mut self, envelope: ResponseEnvelope) -> anyhow::Result<()> {
        let json = serde_json::to_string(&envelope)
            .with_context(|| format!("session {}: envelope serialization", self.session_id))?;
        self.ws
            .send(WsMessage::Text(json))
            .await
            .with_context(|| format!("session {}: channel send failed", self.session_id))
    }
}

// ── Per-payload processing ────────────────────────────────────────────────────

/// The pure part of one processing step: decode, handshake short-circuit, or
/// route.  Split from the session so it can be tested without a socket.
pub fn process_payload(text: &str, encoder: &dyn SurveillanceEncoder) -> RouteOutcome {
    let msg = match ControlMessage::parse(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("undecodable payload: {e}");
            return RouteOutcome {
                envelope: ResponseEnvelope::failure("invalid payload encoding"),
                sample_batch: None,
            };
        }
    };

    if msg.is_handshake() {
        return RouteOutcome {
            envelope: ResponseEnvelope::init_ack(),
            sample_batch: None,
        };
    }

    route(&msg, encoder)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
