//! Compact position reporting (CPR) and altitude field codes.
//!
//! Airborne positions are not transmitted as raw coordinates: each encode
//! produces an *even* and an *odd* frame whose 17-bit latitude/longitude
//! fields are fractions of two slightly different zone grids (NZ = 15).  A
//! receiver combines one frame of each parity to recover an unambiguous
//! global position.
//!
//! Field widths and zone constants follow ICAO Annex 10 Vol IV; the
//! formulation here matches the usual open-source Mode S references.

use std::f64::consts::PI;

/// 2^17 — the CPR fraction scale for airborne positions.
const CPR_SCALE: f64 = 131_072.0;

/// Positive remainder of `a / b` (the CPR `mod` differs from `%` for
/// negative coordinates).
fn pmod(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

/// Number of longitude zones at the given latitude (the `NL` function).
///
/// The closed-form expression is numerically unstable at the equator and
/// poleward of 87°, so those latitudes are special-cased per the standard.
pub fn longitude_zones(latitude: f64) -> u32 {
    if latitude == 0.0 {
        return 59;
    }
    let abs = latitude.abs();
    if abs == 87.0 {
        return 2;
    }
    if abs > 87.0 {
        return 1;
    }
    let nz = 15.0;
    let a = 1.0 - (PI / (2.0 * nz)).cos();
    let b = a / (abs * PI / 180.0).cos().powi(2);
    (2.0 * PI / (1.0 - b).acos()).floor() as u32
}

/// Encodes a latitude/longitude pair into the 17-bit CPR fields of one
/// frame of the requested parity.  Returns `(lat_cpr, lon_cpr)`.
pub fn encode_position(latitude: f64, longitude: f64, odd: bool) -> (u32, u32) {
    // Latitude zone size: 360/60 for even frames, 360/59 for odd.
    let dlat = 360.0 / if odd { 59.0 } else { 60.0 };
    let lat_cpr = (CPR_SCALE * pmod(latitude, dlat) / dlat + 0.5).floor();

    // The longitude zone count depends on the *quantized* latitude the
    // receiver will reconstruct, not the raw input latitude.
    let rlat = dlat * (lat_cpr / CPR_SCALE + (latitude / dlat).floor());
    let nl = longitude_zones(rlat) as i32 - i32::from(odd);
    let dlon = 360.0 / if nl > 0 { f64::from(nl) } else { 1.0 };
    let lon_cpr = (CPR_SCALE * pmod(longitude, dlon) / dlon + 0.5).floor();

    (
        (lat_cpr as u32) & 0x1_FFFF,
        (lon_cpr as u32) & 0x1_FFFF,
    )
}

/// Encodes a barometric altitude in feet into the 12-bit altitude field
/// (25 ft increments, Q-bit set).
///
/// Returns `None` outside the encodable range of −1000 to +50175 ft.
pub fn encode_altitude(altitude_ft: f64) -> Option<u16> {
    if !(-1000.0..=50_175.0).contains(&altitude_ft) {
        return None;
    }
    let n = ((altitude_ft + 1000.0) / 25.0).round() as u16;
    // 11-bit count with the Q bit spliced in at bit 4.
    Some(((n & 0x07F0) << 1) | 0x0010 | (n & 0x000F))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
