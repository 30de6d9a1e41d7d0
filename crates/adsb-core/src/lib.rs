//! # adsb-core
//!
//! Shared library for the ADS-B gateway containing the surveillance frame
//! types and the Mode S extended-squitter encoder.
//!
//! This crate has zero dependencies on sockets, async runtimes, or the
//! gateway's wire protocol.  It defines:
//!
//! - **`frame`** – [`EncodedFrame`], the opaque unit the gateway renders to
//!   hexadecimal for clients and to raw bytes for the sample log.
//!
//! - **`encoder`** – the [`SurveillanceEncoder`] trait (the seam the gateway
//!   dispatches through), the validated [`TransponderIdentity`], and the
//!   concrete [`ModeSEncoder`] producing DF17/DF18 frames with CRC-24 parity
//!   plus Mode A register codes.

pub mod encoder;
pub mod frame;

// Re-export the most-used types at the crate root so callers can write
// `adsb_core::ModeSEncoder` instead of the full module path.
pub use encoder::modes::ModeSEncoder;
pub use encoder::{EncodeError, FramePair, SurveillanceEncoder, TransponderIdentity};
pub use frame::EncodedFrame;
