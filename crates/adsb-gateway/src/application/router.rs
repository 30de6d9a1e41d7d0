//! Message routing: validation, field extraction, and encoder dispatch.
//!
//! The router owns the deterministic mapping from one inbound control
//! message to one response envelope:
//!
//! 1. Check the `message_type` discriminator against the supported set.
//! 2. Extract and type-check the kind's required fields, applying the
//!    documented defaults for optional ones.
//! 3. Invoke the matching encoder operation.
//! 4. Assemble the frames into the success envelope plus the sample batch,
//!    or map the failure onto its client-visible reason.
//!
//! No fault escapes this module: every validation error, absent frame, and
//! encoder fault becomes a failure envelope.  Field values may arrive as
//! JSON numbers or as numeric strings; both coerce.

use thiserror::Error;

use adsb_core::{EncodeError, EncodedFrame, SurveillanceEncoder};

use crate::application::assembler::assemble;
use crate::domain::messages::{ControlMessage, ResponseEnvelope, SurveillanceEvent};

// ── Error type ────────────────────────────────────────────────────────────────

/// Everything that can go wrong between receiving a decoded control message
/// and producing frames.  The `Display` form of each variant is exactly the
/// reason string sent to the client.
#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    /// The discriminator is not one of the four supported kinds.
    #[error("unsupported message type: {0}")]
    UnsupportedType(String),

    /// A required field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but not coercible to its expected type.
    #[error("invalid field value")]
    InvalidFieldValue,

    /// The encoder produced no usable frame for this input.
    #[error("invalid data")]
    NoFrames,

    /// The encoder itself failed; the detail stays in the logs, the client
    /// only learns that the fault was ours.
    #[error("internal error")]
    Encoder(#[source] EncodeError),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// The result of routing one message: the envelope to send back, and the
/// sample batch to persist when the encode succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub envelope: ResponseEnvelope,
    pub sample_batch: Option<Vec<u8>>,
}

/// Routes one non-handshake control message to the encoder and builds the
/// response envelope.  Infallible by design — every error path is already a
/// well-formed failure envelope.
pub fn route(msg: &ControlMessage, encoder: &dyn SurveillanceEncoder) -> RouteOutcome {
    match dispatch(msg, encoder) {
        Ok(frames) => {
            let assembled = assemble(&frames);
            RouteOutcome {
                envelope: ResponseEnvelope::success(assembled.hex_frames),
                sample_batch: Some(assembled.sample_batch),
            }
        }
        Err(error) => {
            tracing::debug!("message rejected: {error}");
            RouteOutcome {
                envelope: ResponseEnvelope::failure(error.to_string()),
                sample_batch: None,
            }
        }
    }
}

fn dispatch(
    msg: &ControlMessage,
    encoder: &dyn SurveillanceEncoder,
) -> Result<Vec<EncodedFrame>, RouteError> {
    let event = extract_event(msg)?;
    let frames = encode_event(&event, encoder).map_err(RouteError::Encoder)?;

    // Only non-empty frames count; a position pair may legitimately come
    // back half-missing, an all-missing result is unusable data.
    let frames: Vec<EncodedFrame> = frames.into_iter().filter(|f| !f.is_empty()).collect();
    if frames.is_empty() {
        return Err(RouteError::NoFrames);
    }
    Ok(frames)
}

/// Validates the discriminator and builds the typed event from the message's
/// fields, applying defaults: `tc` 9, `ss` 0, `nicsb` 0, `timesync` 0,
/// `emergency_state` 0.
pub fn extract_event(msg: &ControlMessage) -> Result<SurveillanceEvent, RouteError> {
    match msg.message_type() {
        Some("airborne_position") => Ok(SurveillanceEvent::AirbornePosition {
            latitude: require_f64(msg, "lat")?,
            longitude: require_f64(msg, "lon")?,
            altitude: require_f64(msg, "altitude")?,
            type_code: optional_u8(msg, "tc", 9)?,
            surveillance_status: optional_u8(msg, "ss", 0)?,
            nic_supplement_b: optional_u8(msg, "nicsb", 0)?,
            time_sync_flag: optional_u8(msg, "timesync", 0)?,
        }),

        Some("ground_velocity") => Ok(SurveillanceEvent::GroundVelocity {
            ground_speed_knots: require_f64(msg, "ground_velocity_kt")?,
            track_angle_degrees: require_f64(msg, "track_angle_deg")?,
            vertical_rate: require_f64(msg, "vertical_rate")?,
        }),

        Some("callsign") => Ok(SurveillanceEvent::CallsignUpdate {
            callsign: require_text(msg, "callsign")?,
        }),

        Some("modeA") => Ok(SurveillanceEvent::ModeACode {
            code: require_squawk(msg, "modeA_code")?,
            emergency_state: optional_u8(msg, "emergency_state", 0)?,
        }),

        _ => Err(RouteError::UnsupportedType(kind_label(msg))),
    }
}

fn encode_event(
    event: &SurveillanceEvent,
    encoder: &dyn SurveillanceEncoder,
) -> Result<Vec<EncodedFrame>, EncodeError> {
    match *event {
        SurveillanceEvent::AirbornePosition {
            latitude,
            longitude,
            altitude,
            type_code,
            surveillance_status,
            nic_supplement_b,
            time_sync_flag,
        } => {
            let (even, odd) = encoder.encode_airborne_position(
                latitude,
                longitude,
                altitude,
                type_code,
                surveillance_status,
                nic_supplement_b,
                time_sync_flag,
            )?;
            // Even before odd, always.
            Ok(even.into_iter().chain(odd).collect())
        }

        SurveillanceEvent::GroundVelocity {
            ground_speed_knots,
            track_angle_degrees,
            vertical_rate,
        } => encoder
            .encode_ground_velocity(ground_speed_knots, track_angle_degrees, vertical_rate)
            .map(|frame| frame.into_iter().collect()),

        SurveillanceEvent::CallsignUpdate { ref callsign } => encoder
            .encode_callsign(callsign)
            .map(|frame| frame.into_iter().collect()),

        SurveillanceEvent::ModeACode {
            code,
            emergency_state,
        } => encoder
            .encode_mode_a(code, emergency_state)
            .map(|frame| frame.into_iter().collect()),
    }
}

// ── Field coercion helpers ────────────────────────────────────────────────────

/// Renders the discriminator for the rejection reason: the raw string when
/// textual, the JSON rendering otherwise, `(none)` when absent.
fn kind_label(msg: &ControlMessage) -> String {
    match msg.field("message_type") {
        None => "(none)".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    // "NaN" and "inf" parse as f64 but are never valid field values.
    parsed.filter(|v| v.is_finite())
}

fn coerce_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => {
            // Fractional numbers truncate, matching integer coercion of the
            // wire protocol's loosely typed fields.
            n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))
        }
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn require_f64(msg: &ControlMessage, name: &'static str) -> Result<f64, RouteError> {
    let value = msg.field(name).ok_or(RouteError::MissingField(name))?;
    coerce_f64(value).ok_or(RouteError::InvalidFieldValue)
}

fn optional_u8(msg: &ControlMessage, name: &'static str, default: u8) -> Result<u8, RouteError> {
    let Some(value) = msg.field(name) else {
        return Ok(default);
    };
    coerce_i64(value)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or(RouteError::InvalidFieldValue)
}

fn require_text(msg: &ControlMessage, name: &'static str) -> Result<String, RouteError> {
    let value = msg.field(name).ok_or(RouteError::MissingField(name))?;
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        _ => Err(RouteError::InvalidFieldValue),
    }
}

/// A squawk arrives as a number (`7700`) or a digit string (`"7700"`); digit
/// validity (octal range) is the encoder's concern, only coercibility is
/// checked here.
fn require_squawk(msg: &ControlMessage, name: &'static str) -> Result<u16, RouteError> {
    let value = msg.field(name).ok_or(RouteError::MissingField(name))?;
    coerce_i64(value)
        .and_then(|v| u16::try_from(v).ok())
        .ok_or(RouteError::InvalidFieldValue)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
