//! Frame assembly: normalising encoder output for the two consumers.
//!
//! Every successful encode ends here.  The assembler takes the ordered frame
//! list the router collected and produces the two renderings of it:
//!
//! - the hexadecimal strings returned to the client, and
//! - the single byte batch appended to the sample log.
//!
//! The two outputs correspond 1:1 in frame order, and the byte batch is the
//! plain concatenation of each frame's byte form — the sample log carries no
//! framing of its own, so order is the only structure it has.

use adsb_core::EncodedFrame;

/// The renderings of one processing step's frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssembledFrames {
    /// Uppercase hexadecimal per frame, in production order.
    pub hex_frames: Vec<String>,
    /// Concatenated raw bytes of all frames, in the same order.
    pub sample_batch: Vec<u8>,
}

/// Renders an ordered frame list into its hex and sample-byte forms.
pub fn assemble(frames: &[EncodedFrame]) -> AssembledFrames {
    let mut assembled = AssembledFrames {
        hex_frames: Vec::with_capacity(frames.len()),
        sample_batch: Vec::new(),
    };
    for frame in frames {
        assembled.hex_frames.push(frame.to_hex());
        assembled.sample_batch.extend_from_slice(&frame.sample_bytes());
    }
    assembled
}

// ── Tests ─────────────────────────────────────────────────────────────────────
