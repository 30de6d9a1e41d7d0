//! Wire message types for the client-facing WebSocket protocol.
//!
//! Clients describe surveillance events as JSON objects; the gateway answers
//! every message with exactly one JSON envelope.
//!
//! # Message flow
//!
//! ```text
//! Client → Gateway:  JSON text frame  →  ControlMessage  →  SurveillanceEvent
//! Gateway → Client:  ResponseEnvelope →  JSON text frame
//! ```
//!
//! # Why a field map instead of a serde-tagged enum?
//!
//! The inbound protocol is not uniformly tagged: the handshake uses a
//! `"type"` discriminator while surveillance messages use `"message_type"`,
//! numeric fields may arrive as JSON numbers *or* numeric strings, and the
//! error contract requires naming the exact missing field.  A serde enum
//! would collapse all of those cases into one opaque deserialization error,
//! so [`ControlMessage`] keeps the decoded object and the application layer
//! extracts fields one at a time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fixed handshake acknowledgment text.
pub const INIT_ACK_MESSAGE: &str = "Server acknowledges connection.";

// ── Inbound: control messages ─────────────────────────────────────────────────

/// One decoded inbound message: a JSON object with a discriminator and named
/// fields.  Lives only for the duration of a single processing step.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlMessage {
    fields: Map<String, Value>,
}

impl ControlMessage {
    /// Decodes `text` as a JSON object.
    ///
    /// # Errors
    ///
    /// Fails when the text is not valid JSON *or* is valid JSON that is not
    /// an object — the protocol's wire unit is a field map, so a bare number
    /// or array is a payload-encoding error, not an internal one.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { fields })
    }

    /// `true` for the stateless handshake message `{"type":"init"}`.
    pub fn is_handshake(&self) -> bool {
        self.fields.get("type").and_then(Value::as_str) == Some("init")
    }

    /// The surveillance discriminator, when present and textual.
    pub fn message_type(&self) -> Option<&str> {
        self.fields.get("message_type").and_then(Value::as_str)
    }

    /// Raw access to one named field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

// ── Validated surveillance events ─────────────────────────────────────────────

/// The validated, typed form of a control message payload.  Exactly one
/// variant per supported message kind; constructed by the router after field
/// extraction and discarded at the end of the processing step.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveillanceEvent {
    /// An airborne position report (`message_type: "airborne_position"`).
    AirbornePosition {
        latitude: f64,
        longitude: f64,
        /// Barometric altitude in feet.
        altitude: f64,
        /// Frame type code; defaults to 9 when the client omits `tc`.
        type_code: u8,
        /// Defaults to 0 when the client omits `ss`.
        surveillance_status: u8,
        /// Defaults to 0 when the client omits `nicsb`.
        nic_supplement_b: u8,
        /// Defaults to 0 when the client omits `timesync`.
        time_sync_flag: u8,
    },

    /// A ground velocity report (`message_type: "ground_velocity"`).
    GroundVelocity {
        ground_speed_knots: f64,
        track_angle_degrees: f64,
        /// Vertical rate in ft/min, positive climbing.
        vertical_rate: f64,
    },

    /// A callsign update (`message_type: "callsign"`).
    CallsignUpdate { callsign: String },

    /// A Mode A ident code (`message_type: "modeA"`).
    ModeACode {
        /// Four octal digits, e.g. `7700`.
        code: u16,
        /// Defaults to 0 when the client omits `emergency_state`.
        emergency_state: u8,
    },
}

// ── Outbound: response envelopes ──────────────────────────────────────────────

/// The reply sent for one inbound message.
///
/// # Serde representation
///
/// The three reply shapes carry no shared tag, so the enum is
/// `untagged` — each variant's field set is disjoint and identifies it:
///
/// ```json
/// {"type":"init_ack","status":"success","message":"Server acknowledges connection."}
/// {"status":"success","adsb_hex_frames":["8D4840D6202CC371C32CE0576098"]}
/// {"status":"failure","reason":"invalid field value"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    /// Handshake acknowledgment; identical for every `init` received.
    InitAck {
        #[serde(rename = "type")]
        kind: String,
        status: String,
        message: String,
    },

    /// Successful encode: the hexadecimal rendering of every produced frame,
    /// in production order.
    Success {
        status: String,
        adsb_hex_frames: Vec<String>,
    },

    /// Any recovered failure, with the reason the client should see.
    Failure { status: String, reason: String },
}

impl ResponseEnvelope {
    /// The fixed handshake acknowledgment.
    pub fn init_ack() -> Self {
        Self::InitAck {
            kind: "init_ack".to_string(),
            status: "success".to_string(),
            message: INIT_ACK_MESSAGE.to_string(),
        }
    }

    pub fn success(adsb_hex_frames: Vec<String>) -> Self {
        Self::Success {
            status: "success".to_string(),
            adsb_hex_frames,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            status: "failure".to_string(),
            reason: reason.into(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
