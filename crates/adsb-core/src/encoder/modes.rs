//! Mode S extended-squitter encoder.
//!
//! Builds complete 112-bit downlink frames for the four surveillance message
//! kinds the gateway accepts.  Frame layout:
//!
//! ```text
//! [DF:5][CA:3][ICAO:24][ME:56][PI:24]   = 112 bits = 14 bytes
//! ```
//!
//! `DF`/`CA`/`ICAO` come from the configured [`TransponderIdentity`], `ME` is
//! the per-message payload packed here, and `PI` is the Mode S CRC-24 parity
//! over the first 11 bytes.  Mode A ident codes are not squitter messages at
//! all — they encode to the classic 13-bit interleaved reply code and are
//! returned in register (integer) form.
//!
//! Unencodable input (out-of-range coordinate, bad callsign character, …)
//! yields an absent frame rather than an error; only a misconfigured
//! identity is an encoder fault.

use tracing::trace;

use crate::encoder::cpr;
use crate::encoder::{EncodeError, FramePair, SurveillanceEncoder, TransponderIdentity};
use crate::frame::EncodedFrame;

/// Number of bytes in a full extended squitter frame.
pub const SQUITTER_FRAME_LEN: usize = 14;

/// Type code used for callsign (aircraft identification) messages.
const TC_IDENTIFICATION: u8 = 4;

/// Type code used for airborne velocity messages.
const TC_VELOCITY: u8 = 19;

/// The stateless Mode S encoder.  One instance is built per connection from
/// the process-wide identity; all operations take `&self`.
#[derive(Debug, Clone, Copy)]
pub struct ModeSEncoder {
    identity: TransponderIdentity,
}

impl ModeSEncoder {
    pub fn new(identity: TransponderIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> TransponderIdentity {
        self.identity
    }

    /// Wraps a 56-bit ME payload into a complete parity-protected frame.
    fn extended_squitter(&self, me: u64) -> Result<EncodedFrame, EncodeError> {
        // Only DF 17 (transponder) and DF 18 (non-transponder) downlink
        // formats carry the 56-bit ME field.
        let df = self.identity.downlink_format;
        if df != 17 && df != 18 {
            return Err(EncodeError::UnsupportedDownlinkFormat(df));
        }

        let mut frame = Vec::with_capacity(SQUITTER_FRAME_LEN);
        frame.push((df << 3) | (self.identity.capability & 0x07));
        frame.extend_from_slice(&self.identity.icao_address.to_be_bytes()[1..4]);
        for shift in (0..7).rev() {
            frame.push(((me >> (8 * shift)) & 0xFF) as u8);
        }
        let parity = crc24(&frame);
        frame.extend_from_slice(&parity.to_be_bytes()[1..4]);
        Ok(EncodedFrame::Data(frame))
    }
}

impl SurveillanceEncoder for ModeSEncoder {
    fn encode_airborne_position(
        &self,
        latitude: f64,
        longitude: f64,
        altitude_ft: f64,
        type_code: u8,
        surveillance_status: u8,
        nic_supplement_b: u8,
        time_sync: u8,
    ) -> Result<FramePair, EncodeError> {
        // TCs 9–18 are the barometric-altitude airborne position codes.
        if !(9..=18).contains(&type_code)
            || surveillance_status > 3
            || nic_supplement_b > 1
            || time_sync > 1
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Ok((None, None));
        }
        let Some(altitude_field) = cpr::encode_altitude(altitude_ft) else {
            return Ok((None, None));
        };

        let mut pair = [None, None];
        for (slot, odd) in pair.iter_mut().zip([false, true]) {
            let (lat_cpr, lon_cpr) = cpr::encode_position(latitude, longitude, odd);

            // ME: TC(5) SS(2) NICsb(1) ALT(12) T(1) F(1) LAT(17) LON(17)
            let mut me: u64 = u64::from(type_code);
            me = (me << 2) | u64::from(surveillance_status);
            me = (me << 1) | u64::from(nic_supplement_b);
            me = (me << 12) | u64::from(altitude_field);
            me = (me << 1) | u64::from(time_sync);
            me = (me << 1) | u64::from(odd);
            me = (me << 17) | u64::from(lat_cpr);
            me = (me << 17) | u64::from(lon_cpr);

            *slot = Some(self.extended_squitter(me)?);
        }
        trace!(type_code, "encoded airborne position pair");
        let [even, odd] = pair;
        Ok((even, odd))
    }

    fn encode_ground_velocity(
        &self,
        ground_speed_kt: f64,
        track_angle_deg: f64,
        vertical_rate_fpm: f64,
    ) -> Result<Option<EncodedFrame>, EncodeError> {
        // Subtype 1 carries subsonic ground speeds up to 1021.5 kt; the
        // vertical rate field tops out at 509 increments of 64 ft/min.
        if !(0.0..=1022.0).contains(&ground_speed_kt)
            || !track_angle_deg.is_finite()
            || !vertical_rate_fpm.is_finite()
            || vertical_rate_fpm.abs() > 32_576.0
        {
            return Ok(None);
        }

        // Decompose speed-over-ground along the track into signed east and
        // north components, each coded as magnitude + 1 (0 means "no info").
        let track = track_angle_deg.rem_euclid(360.0).to_radians();
        let east = ground_speed_kt * track.sin();
        let north = ground_speed_kt * track.cos();
        let ew_sign = u64::from(east < 0.0);
        let ew_speed = east.abs().round() as u64 + 1;
        let ns_sign = u64::from(north < 0.0);
        let ns_speed = north.abs().round() as u64 + 1;

        let vr_sign = u64::from(vertical_rate_fpm < 0.0);
        let vr_code = (vertical_rate_fpm.abs() / 64.0).round() as u64 + 1;

        // ME: TC(5) ST(3) IC(1) IFR(1) NUCv(3) Dew(1) Vew(10) Dns(1)
        //     Vns(10) VrSrc(1) Svr(1) VR(9) resv(2) SDif(1) dAlt(7)
        let mut me: u64 = u64::from(TC_VELOCITY);
        me = (me << 3) | 1; // subtype 1: ground speed
        me <<= 5; // IC, IFR, NUCv
        me = (me << 1) | ew_sign;
        me = (me << 10) | ew_speed;
        me = (me << 1) | ns_sign;
        me = (me << 10) | ns_speed;
        me = (me << 1) | 1; // vertical rate source: barometric
        me = (me << 1) | vr_sign;
        me = (me << 9) | vr_code;
        me <<= 10; // reserved, SDif, dAlt

        self.extended_squitter(me).map(Some)
    }

    fn encode_callsign(&self, callsign: &str) -> Result<Option<EncodedFrame>, EncodeError> {
        if callsign.is_empty() || callsign.len() > 8 {
            return Ok(None);
        }

        // ME: TC(5) CAT(3) then eight 6-bit characters, space padded.
        let mut me: u64 = u64::from(TC_IDENTIFICATION) << 3;
        for index in 0..8 {
            let ch = callsign.as_bytes().get(index).copied().unwrap_or(b' ');
            let Some(code) = sixbit_char(ch) else {
                return Ok(None);
            };
            me = (me << 6) | u64::from(code);
        }

        self.extended_squitter(me).map(Some)
    }

    fn encode_mode_a(
        &self,
        code: u16,
        emergency_state: u8,
    ) -> Result<Option<EncodedFrame>, EncodeError> {
        if code > 7777 || emergency_state > 7 {
            return Ok(None);
        }
        // The four squawk digits are octal: A (thousands) through D (units).
        let digits = [code / 1000, code / 100 % 10, code / 10 % 10, code % 10];
        if digits.iter().any(|&d| d > 7) {
            return Ok(None);
        }
        let [a, b, c, d] = digits;

        // Classic Mode A reply interleave, pulse order
        // C1 A1 C2 A2 C4 A4 X B1 D1 B2 D2 B4 D4 (X always zero).
        let bit = |digit: u16, weight: u16| u32::from(digit & weight != 0);
        let mut ident: u32 = 0;
        for (digit, weight) in [(c, 1), (a, 1), (c, 2), (a, 2), (c, 4), (a, 4)] {
            ident = (ident << 1) | bit(digit, weight);
        }
        ident <<= 1; // X
        for (digit, weight) in [(b, 1), (d, 1), (b, 2), (d, 2), (b, 4), (d, 4)] {
            ident = (ident << 1) | bit(digit, weight);
        }

        // Register layout: emergency state in bits 13–15, ident code below.
        let register = (u32::from(emergency_state) << 13) | ident;
        Ok(Some(EncodedFrame::Register(register)))
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

/// Maps one callsign character to its 6-bit code (A–Z → 1–26, digits keep
/// their ASCII value, space → 32).  Lowercase letters are accepted and
/// upcased; anything else is unencodable.
fn sixbit_char(ch: u8) -> Option<u8> {
    match ch {
        b'A'..=b'Z' => Some(ch - b'A' + 1),
        b'a'..=b'z' => Some(ch - b'a' + 1),
        b'0'..=b'9' => Some(ch),
        b' ' => Some(32),
        _ => None,
    }
}

/// Mode S CRC-24 (generator polynomial `0xFFF409`) over `data`.
pub fn crc24(data: &[u8]) -> u32 {
    let mut remainder: u32 = 0;
    for &byte in data {
        remainder ^= u32::from(byte) << 16;
        for _ in 0..8 {
            remainder = if remainder & 0x80_0000 != 0 {
                (remainder << 1) ^ 0xFF_F409
            } else {
                remainder << 1
            };
        }
    }
    remainder & 0xFF_FFFF
}

// ── Tests ─────────────────────────────────────────────────────────────────────
