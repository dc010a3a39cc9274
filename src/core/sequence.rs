//! Per-channel sequence counter checks

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Reaction to a sequence gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Count the gap, log it and continue from the new counter
    #[default]
    Resync,
    /// Treat the gap as fatal
    Halt,
}

/// Result of observing one sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// First frame on the channel
    First,
    InOrder,
    /// `missed` frames were skipped (a repeated or reordered counter
    /// counts as 255 missed frames)
    Gap { expected: u8, actual: u8, missed: u8 },
}

/// Tracks the expected sequence counter of one stream
///
/// Counters wrap at 255, so 255 followed by 0 is in order.
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    channel: &'static str,
    policy: GapPolicy,
    last: Option<u8>,
    gaps: u64,
    missed: u64,
}

impl SequenceTracker {
    pub fn new(channel: &'static str, policy: GapPolicy) -> Self {
        Self {
            channel,
            policy,
            last: None,
            gaps: 0,
            missed: 0,
        }
    }

    /// Record `sequence` and classify it against the previous counter
    ///
    /// Under [`GapPolicy::Halt`] a gap is returned as
    /// [`Error::SequenceGap`]; the tracker has already resynchronised.
    pub fn observe(&mut self, sequence: u8) -> Result<SequenceCheck> {
        let check = match self.last {
            None => SequenceCheck::First,
            Some(last) => {
                let expected = last.wrapping_add(1);
                if sequence == expected {
                    SequenceCheck::InOrder
                } else {
                    SequenceCheck::Gap {
                        expected,
                        actual: sequence,
                        missed: sequence.wrapping_sub(expected),
                    }
                }
            }
        };
        self.last = Some(sequence);

        if let SequenceCheck::Gap {
            expected,
            actual,
            missed,
        } = check
        {
            self.gaps += 1;
            self.missed += u64::from(missed);
            log::warn!(
                "{}: sequence gap, expected {} got {} ({} missed)",
                self.channel,
                expected,
                actual,
                missed
            );
            if self.policy == GapPolicy::Halt {
                return Err(Error::SequenceGap {
                    channel: self.channel,
                    expected,
                    actual,
                });
            }
        }
        Ok(check)
    }

    /// Number of gaps seen
    pub fn gaps(&self) -> u64 {
        self.gaps
    }

    /// Estimated frames lost across all gaps
    pub fn missed(&self) -> u64 {
        self.missed
    }

    pub fn channel(&self) -> &'static str {
        self.channel
    }

    /// Forget the last counter; the next frame is treated as the first
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_stream() {
        let mut tracker = SequenceTracker::new("ir", GapPolicy::Resync);
        assert_eq!(tracker.observe(10).unwrap(), SequenceCheck::First);
        assert_eq!(tracker.observe(11).unwrap(), SequenceCheck::InOrder);
        assert_eq!(tracker.observe(12).unwrap(), SequenceCheck::InOrder);
        assert_eq!(tracker.gaps(), 0);
    }

    #[test]
    fn test_wraparound_is_in_order() {
        let mut tracker = SequenceTracker::new("ir", GapPolicy::Halt);
        tracker.observe(254).unwrap();
        assert_eq!(tracker.observe(255).unwrap(), SequenceCheck::InOrder);
        assert_eq!(tracker.observe(0).unwrap(), SequenceCheck::InOrder);
    }

    #[test]
    fn test_resync_after_gap() {
        let mut tracker = SequenceTracker::new("ir", GapPolicy::Resync);
        tracker.observe(1).unwrap();
        assert_eq!(
            tracker.observe(5).unwrap(),
            SequenceCheck::Gap {
                expected: 2,
                actual: 5,
                missed: 3
            }
        );
        // Stream continues from the new counter
        assert_eq!(tracker.observe(6).unwrap(), SequenceCheck::InOrder);
        assert_eq!(tracker.gaps(), 1);
        assert_eq!(tracker.missed(), 3);
    }

    #[test]
    fn test_halt_policy_reports_gap() {
        let mut tracker = SequenceTracker::new("front", GapPolicy::Halt);
        tracker.observe(1).unwrap();
        match tracker.observe(3) {
            Err(Error::SequenceGap {
                channel,
                expected,
                actual,
            }) => {
                assert_eq!(channel, "front");
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected gap error, got {:?}", other),
        }
    }

    #[test]
    fn test_reset() {
        let mut tracker = SequenceTracker::new("ir", GapPolicy::Halt);
        tracker.observe(1).unwrap();
        tracker.reset();
        assert_eq!(tracker.observe(9).unwrap(), SequenceCheck::First);
    }
}
