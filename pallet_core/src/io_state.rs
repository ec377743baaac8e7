//! Input/output bitmask state shown by the indicator lamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of bits displayed per mask.
pub const IO_BITS: usize = 5;

/// The single row of the `io_data` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoState {
    pub input: i64,
    pub output: i64,
}

impl IoState {
    pub fn new(input: i64, output: i64) -> Self {
        IoState { input, output }
    }

    pub fn input_bits(&self) -> [bool; IO_BITS] {
        bits(self.input)
    }

    pub fn output_bits(&self) -> [bool; IO_BITS] {
        bits(self.output)
    }
}

/// Low [`IO_BITS`] bits of `mask`, least significant first.
pub fn bits(mask: i64) -> [bool; IO_BITS] {
    let mut out = [false; IO_BITS];
    for (i, bit) in out.iter_mut().enumerate() {
        *bit = (mask >> i) & 1 == 1;
    }
    out
}

/// Result of one poll of the I/O store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoReading {
    pub state: IoState,
    pub read_at: DateTime<Utc>,
    /// Set when the read failed and `state` fell back to zeros
    pub error: Option<String>,
}

impl IoReading {
    pub fn ok(state: IoState) -> Self {
        IoReading {
            state,
            read_at: Utc::now(),
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        IoReading {
            state: IoState::default(),
            read_at: Utc::now(),
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_extraction() {
        assert_eq!(bits(0), [false; 5]);
        assert_eq!(bits(0b10101), [true, false, true, false, true]);
        assert_eq!(bits(0b00010), [false, true, false, false, false]);
        // Only the low five bits are shown
        assert_eq!(bits(0b100000), [false; 5]);
        assert_eq!(bits(0b111111), [true; 5]);
    }

    #[test]
    fn test_state_bits() {
        let state = IoState::new(1, 16);
        assert_eq!(state.input_bits(), [true, false, false, false, false]);
        assert_eq!(state.output_bits(), [false, false, false, false, true]);
    }

    #[test]
    fn test_failed_reading_shows_zeros() {
        let reading = IoReading::failed("no such table: io_data");
        assert_eq!(reading.state, IoState::default());
        assert!(reading.error.is_some());
    }
}
