//! # Cyclic Destination Sequencer
//!
//! Destinations are drawn from the fixed cyclic domain `1..=slots` (11 slots
//! on the warehouse floor). The sequencer is a pure round-robin counter: the
//! next destination is the last one handed out plus one, wrapping back to 1.
//! It never fills gaps left by deleted orders.
//!
//! The counter is explicit state. It is not derived from `MAX(Destino)` or
//! from the last row, so swapping two orders never changes what the next
//! insert receives.
//!
//! ```rust
//! use pallet_core::sequencer::DestinationSequencer;
//!
//! let mut seq = DestinationSequencer::new(11);
//! let assigned: Vec<i64> = (0..12).map(|_| seq.advance()).collect();
//! assert_eq!(assigned, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 1]);
//! ```

use serde::{Deserialize, Serialize};

/// Number of destination slots on the floor.
pub const DESTINATION_SLOTS: i64 = 11;

/// Round-robin destination counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSequencer {
    slots: i64,
    /// Destination handed to the most recent insert, if any
    last: Option<i64>,
}

impl DestinationSequencer {
    /// Create a sequencer with no history. `slots` below 1 is treated as 1.
    pub fn new(slots: i64) -> Self {
        DestinationSequencer {
            slots: slots.max(1),
            last: None,
        }
    }

    /// Resume from a persisted counter value. Out-of-domain values are
    /// discarded so the next destination restarts at 1.
    pub fn resume(slots: i64, last: Option<i64>) -> Self {
        let mut seq = DestinationSequencer::new(slots);
        seq.last = last.filter(|d| seq.contains(*d));
        seq
    }

    pub fn slots(&self) -> i64 {
        self.slots
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }

    /// Whether `destination` lies in `1..=slots`
    pub fn contains(&self, destination: i64) -> bool {
        (1..=self.slots).contains(&destination)
    }

    /// Peek at the next destination without consuming it.
    pub fn peek(&self) -> i64 {
        match self.last {
            None => 1,
            Some(last) if last >= self.slots => 1,
            Some(last) => last + 1,
        }
    }

    /// Consume and return the next destination.
    pub fn advance(&mut self) -> i64 {
        let next = self.peek();
        self.last = Some(next);
        next
    }

    /// Forget history; the next destination will be 1.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Destinations for `count` orders renumbered in insertion order:
    /// `(index mod slots) + 1`. Leaves the counter on the last value issued.
    pub fn renumber(&mut self, count: usize) -> Vec<i64> {
        self.clear();
        (0..count).map(|_| self.advance()).collect()
    }
}

impl Default for DestinationSequencer {
    fn default() -> Self {
        DestinationSequencer::new(DESTINATION_SLOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_destination_is_one() {
        let seq = DestinationSequencer::default();
        assert_eq!(seq.peek(), 1);
    }

    #[test]
    fn test_twelve_inserts_wrap() {
        let mut seq = DestinationSequencer::default();
        let assigned: Vec<i64> = (0..12).map(|_| seq.advance()).collect();
        assert_eq!(assigned, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 1]);
    }

    #[test]
    fn test_destinations_stay_in_domain() {
        let mut seq = DestinationSequencer::default();
        for _ in 0..100 {
            let d = seq.advance();
            assert!((1..=11).contains(&d), "destination {} out of range", d);
        }
    }

    #[test]
    fn test_renumber_matches_index_mod_slots() {
        let mut seq = DestinationSequencer::default();
        seq.advance();
        seq.advance();
        let renumbered = seq.renumber(25);
        for (i, d) in renumbered.iter().enumerate() {
            assert_eq!(*d, (i as i64 % 11) + 1);
        }
        // Next insert continues after the last renumbered order (25th -> 3)
        assert_eq!(seq.peek(), 4);
    }

    #[test]
    fn test_resume_discards_out_of_range() {
        assert_eq!(DestinationSequencer::resume(11, Some(11)).peek(), 1);
        assert_eq!(DestinationSequencer::resume(11, Some(5)).peek(), 6);
        assert_eq!(DestinationSequencer::resume(11, Some(42)).peek(), 1);
        assert_eq!(DestinationSequencer::resume(11, Some(0)).peek(), 1);
    }

    #[test]
    fn test_single_slot() {
        let mut seq = DestinationSequencer::new(0);
        assert_eq!(seq.slots(), 1);
        assert_eq!(seq.advance(), 1);
        assert_eq!(seq.advance(), 1);
    }
}
