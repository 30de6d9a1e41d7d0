//! The surveillance encoder seam.
//!
//! The gateway consumes the encoder through the [`SurveillanceEncoder`]
//! trait: four operations, one per supported surveillance message kind.  The
//! concrete Mode S implementation lives in [`modes`]; tests substitute mocks.
//!
//! # Output contract
//!
//! Every operation distinguishes two failure shapes:
//!
//! - `Ok(None)` (or `Ok((None, None))` for positions) — the input cannot be
//!   encoded (out-of-range coordinate, invalid callsign character, …).  The
//!   caller reports this as unusable data.
//! - `Err(EncodeError)` — the encoder itself is faulty or misconfigured.
//!   The caller reports this as an internal error.

pub mod cpr;
pub mod modes;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::EncodedFrame;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised by an encoder implementation itself (as opposed to
/// unencodable input, which is reported as an absent frame).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The configured downlink format cannot carry extended squitter
    /// messages (only DF 17 and DF 18 can).
    #[error("downlink format {0} cannot carry extended squitter")]
    UnsupportedDownlinkFormat(u8),

    /// An identity field is out of its wire range.
    #[error("invalid transponder identity: {0}")]
    InvalidIdentity(&'static str),
}

// ── Transponder identity ──────────────────────────────────────────────────────

/// The session-scoped transmitter identity stamped into every frame.
///
/// One identity is configured per process, but each connection builds its own
/// encoder instance from it — encoder calls are stateless, so sessions can
/// never interfere through shared encoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransponderIdentity {
    /// Mode S downlink format (DF 17 for aircraft extended squitter,
    /// DF 18 for non-transponder devices).
    pub downlink_format: u8,
    /// 24-bit ICAO transponder address.
    pub icao_address: u32,
    /// 3-bit transponder capability code.
    pub capability: u8,
}

impl TransponderIdentity {
    /// Builds a validated identity.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidIdentity`] if the downlink format is
    /// wider than 5 bits, the address wider than 24 bits, or the capability
    /// wider than 3 bits.
    pub fn new(downlink_format: u8, icao_address: u32, capability: u8) -> Result<Self, EncodeError> {
        if downlink_format > 24 {
            return Err(EncodeError::InvalidIdentity("downlink format exceeds 5 bits"));
        }
        if icao_address > 0xFF_FFFF {
            return Err(EncodeError::InvalidIdentity("ICAO address exceeds 24 bits"));
        }
        if capability > 0x07 {
            return Err(EncodeError::InvalidIdentity("capability exceeds 3 bits"));
        }
        Ok(Self {
            downlink_format,
            icao_address,
            capability,
        })
    }
}

impl Default for TransponderIdentity {
    /// The original deployment's fixed identity: DF 17, ICAO `A1B2C3`,
    /// capability 5 (level 2 transponder, airborne or on ground).
    fn default() -> Self {
        Self {
            downlink_format: 17,
            icao_address: 0xA1_B2C3,
            capability: 5,
        }
    }
}

// ── Encoder trait ─────────────────────────────────────────────────────────────

/// An even/odd frame pair as produced by one position encode operation.
/// Position messages split into two compact-position-report halves; either
/// half may be absent when the input is unencodable.
pub type FramePair = (Option<EncodedFrame>, Option<EncodedFrame>);

/// The four encode operations the gateway dispatches to.
///
/// Implementations must be stateless per call (`&self`) and shareable across
/// tasks — the gateway invokes them concurrently from independent sessions.
pub trait SurveillanceEncoder: Send + Sync {
    /// Encodes an airborne position report into its even and odd
    /// compact-position frames, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] only for encoder-side faults; unencodable
    /// input yields `Ok((None, None))`.
    #[allow(clippy::too_many_arguments)]
    fn encode_airborne_position(
        &self,
        latitude: f64,
        longitude: f64,
        altitude_ft: f64,
        type_code: u8,
        surveillance_status: u8,
        nic_supplement_b: u8,
        time_sync: u8,
    ) -> Result<FramePair, EncodeError>;

    /// Encodes a ground velocity report (speed over ground in knots, true
    /// track in degrees, vertical rate in ft/min).
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] only for encoder-side faults.
    fn encode_ground_velocity(
        &self,
        ground_speed_kt: f64,
        track_angle_deg: f64,
        vertical_rate_fpm: f64,
    ) -> Result<Option<EncodedFrame>, EncodeError>;

    /// Encodes a callsign update (up to 8 characters, A–Z, 0–9, space).
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] only for encoder-side faults.
    fn encode_callsign(&self, callsign: &str) -> Result<Option<EncodedFrame>, EncodeError>;

    /// Encodes a Mode A ident code (four octal digits, e.g. `7700`) together
    /// with a 3-bit emergency state.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] only for encoder-side faults.
    fn encode_mode_a(
        &self,
        code: u16,
        emergency_state: u8,
    ) -> Result<Option<EncodedFrame>, EncodeError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
