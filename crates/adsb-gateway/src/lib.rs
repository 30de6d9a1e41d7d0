//! adsb-gateway library crate.
//!
//! A real-time gateway that accepts surveillance-event descriptions as JSON
//! over WebSocket, encodes each into Mode S frames through `adsb-core`,
//! returns the frames' hexadecimal form to the sender, and appends the raw
//! frame bytes to a shared sample log for offline playback.
//!
//! # Architecture
//!
//! ```text
//! Client (JSON over WebSocket)
//!         ↕
//! [adsb-gateway]
//!   ├── domain/           Wire types: ControlMessage, SurveillanceEvent,
//!   │                     ResponseEnvelope, GatewayConfig
//!   ├── application/      MessageRouter + FrameAssembler (pure logic)
//!   └── infrastructure/
//!         ├── ws_server/  Accept loop (tokio-tungstenite)
//!         ├── session/    Per-connection receive/respond loop
//!         └── sample_sink/ Append-only sample log (single shared mutex)
//!         ↕
//! adsb-core  (SurveillanceEncoder trait + ModeSEncoder)
//! ```
//!
//! # Layer rules
//!
//! - `domain` depends on serde and `adsb-core` types only.
//! - `application` depends on `domain` and `adsb-core` only — no I/O, no
//!   async, trivially unit-testable.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.

/// Domain layer: wire types and configuration.
pub mod domain;

/// Application layer: message routing and frame assembly.
pub mod application;

/// Infrastructure layer: WebSocket server, sessions, sample log.
pub mod infrastructure;
