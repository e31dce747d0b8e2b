//! Pulse segmentation and bit thresholding.
//!
//! These stages are pure: they consume a raw level sequence captured by the
//! driver and know nothing about pins or timing hardware. The sensor encodes
//! each of its 40 data bits as the width of one high pulse, so decoding is a
//! matter of extracting those widths and splitting them into two populations.

use heapless::Vec;

/// Number of data pulses in one complete transmission: 5 bytes of 8 bits.
pub const PULSES_PER_FRAME: usize = 40;

/// Segmenter states, walked edge-by-edge over the raw samples.
///
/// The first three states skip the host's released line and the sensor's
/// acknowledgement pulse; the last two alternate for the 40 data pulses.
enum State {
    /// Waiting for the sensor to pull the line low after the handshake.
    AwaitStartFall,
    /// Waiting for the acknowledgement pulse to go high.
    AwaitAckRise,
    /// Waiting for the first data bit's leading edge to fall.
    AwaitDataFall,
    /// In the low gap between pulses, waiting for the next pulse to rise.
    InGap,
    /// Inside a high data pulse, waiting for it to fall.
    InPulse,
}

/// Extracts the widths (in sample counts) of the high data pulses from a raw
/// level sequence (`true` = line high).
///
/// The width counter increments on every sample and resets on the rising edge
/// that starts a pulse, so a pulse's recorded width is the number of samples
/// the line stayed high. Collection stops once 40 pulses are recognized or the
/// samples run out; the result therefore never holds more than 40 entries.
pub fn segment(samples: &[bool]) -> Vec<u16, PULSES_PER_FRAME> {
    let mut widths = Vec::new();
    let mut state = State::AwaitStartFall;
    let mut width: u16 = 0;

    for &high in samples {
        width = width.saturating_add(1);
        match state {
            State::AwaitStartFall if !high => state = State::AwaitAckRise,
            State::AwaitAckRise if high => state = State::AwaitDataFall,
            State::AwaitDataFall if !high => state = State::InGap,
            State::InGap if high => {
                width = 0;
                state = State::InPulse;
            }
            State::InPulse if !high => {
                // Cannot overflow: we stop as soon as the vec fills.
                let _ = widths.push(width);
                if widths.is_full() {
                    break;
                }
                state = State::InGap;
            }
            _ => {}
        }
    }

    widths
}

/// Classifies pulse widths into bits using the midpoint of the observed
/// extremes: a width strictly above halfway is a 1, otherwise a 0.
///
/// The two bit values show up as two well-separated width populations, so the
/// adaptive midpoint tracks whatever sampling rate the host achieves instead
/// of hard-coding a physical-time threshold. Only the first 40 widths are
/// considered.
pub fn threshold(widths: &[u16]) -> Vec<bool, PULSES_PER_FRAME> {
    let shortest = widths.iter().copied().min().unwrap_or(0);
    let longest = widths.iter().copied().max().unwrap_or(0);
    let halfway = shortest + (longest - shortest) / 2;

    widths
        .iter()
        .take(PULSES_PER_FRAME)
        .map(|&w| w > halfway)
        .collect()
}
