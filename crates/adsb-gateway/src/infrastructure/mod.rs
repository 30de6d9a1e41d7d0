//! Infrastructure layer for the ADS-B gateway.
//!
//! All I/O lives here:
//!
//! - `ws_server` — TCP listener, WebSocket upgrades, per-session task
//!   spawning, shutdown flag handling.
//! - `session` — the per-connection receive/respond loop.
//! - `sample_sink` — the shared append-only sample log.
//!
//! Protocol translation belongs to the application layer; message and
//! configuration types belong to the domain layer.

pub mod sample_sink;
pub mod session;
pub mod ws_server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use sample_sink::SampleSink;
pub use ws_server::{run_server, serve};
