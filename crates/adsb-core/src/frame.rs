//! Encoded surveillance frame representation.
//!
//! An encoder operation produces frames in one of two wire shapes:
//!
//! - **`Data`** – a raw byte sequence (e.g. a 112-bit extended squitter as
//!   14 bytes).
//! - **`Register`** – an unsigned integer standing for a fixed-width 24-bit
//!   value (e.g. a Mode A surveillance-reply register).
//!
//! The gateway never inspects frame contents.  It only needs the two
//! renderings defined here: the uppercase hexadecimal text sent back to the
//! client, and the raw byte form appended to the sample log.  Both renderings
//! must stay 1:1 with each other — the N-th hex string always describes the
//! N-th byte batch.

use serde::{Deserialize, Serialize};

/// A single encoded surveillance frame, opaque beyond its two renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodedFrame {
    /// An ordered byte sequence.
    Data(Vec<u8>),
    /// A fixed-width 24-bit value.  Values wider than 24 bits are truncated
    /// to their low 24 bits at render time.
    Register(u32),
}

impl EncodedFrame {
    /// Renders the frame as uppercase hexadecimal with no separators.
    ///
    /// `Data` frames render two digits per byte; `Register` frames render
    /// exactly six digits, zero-padded (`0x2A` → `"00002A"`).
    pub fn to_hex(&self) -> String {
        match self {
            EncodedFrame::Data(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2);
                for byte in bytes {
                    out.push_str(&format!("{byte:02X}"));
                }
                out
            }
            EncodedFrame::Register(value) => format!("{:06X}", value & 0xFF_FFFF),
        }
    }

    /// Returns the raw byte form persisted to the sample log.
    ///
    /// `Data` frames persist as-is; `Register` frames persist as exactly
    /// 3 bytes, big-endian.
    pub fn sample_bytes(&self) -> Vec<u8> {
        match self {
            EncodedFrame::Data(bytes) => bytes.clone(),
            EncodedFrame::Register(value) => {
                let masked = value & 0xFF_FFFF;
                masked.to_be_bytes()[1..4].to_vec()
            }
        }
    }

    /// `true` for a byte frame with no content.  Empty frames carry nothing
    /// renderable and are dropped when encoder output is collected.
    pub fn is_empty(&self) -> bool {
        matches!(self, EncodedFrame::Data(bytes) if bytes.is_empty())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
